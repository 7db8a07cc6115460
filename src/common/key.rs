use serde::{Deserialize, Serialize};
use std::{fmt, ops};

/// Name of the key attribute every item carries.
pub const KEY_ATTRIBUTE: &str = "key";

/// Key of a single item.
///
/// ```rust
/// use deta_base_crud::common::key;
///
/// let key = key::Key::from("user-1");
/// assert_eq!(&*key, "user-1");
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl ops::Deref for Key {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}
