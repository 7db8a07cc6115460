use crate::{
    Error, Result,
    common::{self, key},
    model::{base::Base, field::Field},
    write::update_item::UpdatePayload,
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt, marker};

/// An item of the Base `B`.
///
/// ```rust
/// use deta_base_crud::model::{base::Base, field::Field, item::Item};
///
/// struct User;
///
/// impl User {
///     const NAME: Field<String> = Field::new("name");
/// }
///
/// impl Base for User {
///     const NAME: &'static str = "users";
/// }
///
/// let user: Item<User> = Item::new().with(&User::NAME, "jane");
/// assert_eq!(user.get(&User::NAME).unwrap(), "jane");
/// ```
pub struct Item<B> {
    raw: common::RawItem,
    _base: marker::PhantomData<fn() -> B>,
}

impl<B> Item<B> {
    pub(crate) fn from_raw(raw: common::RawItem) -> Self {
        Self {
            raw,
            _base: marker::PhantomData,
        }
    }

    /// Set the value of a field.
    ///
    /// A dotted field name addresses a nested attribute; missing or non-object
    /// parents are replaced with objects.
    pub fn with<T: Into<Value>>(mut self, field: &Field<T>, value: impl Into<T>) -> Self {
        let value: T = value.into();
        let path: Vec<&str> = field.name().split(common::PATH_SEPARATOR).collect();
        insert_at(&mut self.raw, &path, value.into());
        self
    }

    /// Read the value of a field.
    ///
    /// Fails with [`Error::MissingField`] if the item has no such attribute.
    pub fn get<T: DeserializeOwned>(&self, field: &Field<T>) -> Result<T> {
        let value = self
            .get_value(field.name())
            .ok_or_else(|| Error::MissingField(field.name().to_string()))?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Raw value at a (possibly dotted) attribute path.
    pub fn get_value(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split(common::PATH_SEPARATOR);
        let first = parts.next()?;
        parts.try_fold(self.raw.get(first)?, |value, part| value.get(part))
    }

    /// The key of the item.
    pub fn key(&self) -> Result<key::Key> {
        match self.raw.get(key::KEY_ATTRIBUTE) {
            Some(Value::String(key)) => Ok(key.as_str().into()),
            _ => Err(Error::MissingField(key::KEY_ATTRIBUTE.to_string())),
        }
    }

    /// The underlying attribute map.
    pub fn raw(&self) -> &common::RawItem {
        &self.raw
    }

    /// Consume the item, returning the underlying attribute map.
    pub fn into_raw(self) -> common::RawItem {
        self.raw
    }

    /// The item as it would look once `payload` has been applied by the service.
    pub fn apply(&self, payload: &UpdatePayload) -> Result<Self> {
        payload.apply(&self.raw).map(Self::from_raw)
    }
}

fn insert_at(item: &mut common::RawItem, path: &[&str], value: Value) {
    match path {
        [] => {}
        [name] => {
            item.insert(name.to_string(), value);
        }
        [parent, rest @ ..] => {
            let entry = item
                .entry(parent.to_string())
                .or_insert_with(|| Value::Object(common::RawItem::new()));
            if !entry.is_object() {
                *entry = Value::Object(common::RawItem::new());
            }
            if let Value::Object(child) = entry {
                insert_at(child, rest, value);
            }
        }
    }
}

impl<B: Base> Item<B> {
    /// An item holding only the Base defaults.
    pub fn new() -> Self {
        Self::from_raw(B::defaults())
    }

    /// An item holding `values`, completed with the Base defaults.
    pub fn from_values(values: common::RawItem) -> Self {
        let mut raw = B::defaults();
        raw.extend(values);
        Self::from_raw(raw)
    }
}

impl<B: Base> Default for Item<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Clone for Item<B> {
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone())
    }
}

impl<B> fmt::Debug for Item<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Item").field(&self.raw).finish()
    }
}

impl<B> PartialEq for Item<B> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<B> Serialize for Item<B> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<B> common::FromItem for Item<B> {
    fn from_item(item: common::RawItem) -> Self {
        Self::from_raw(item)
    }
}
