use crate::{Result, common};

use serde::Serialize;

/// Internal representation of write operation parameters.
///
/// Holds the processed write parameters after conversion from the public
/// `WriteArgs` type, with the expiry resolved to a Unix timestamp.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct WriteInput {
    pub(crate) base_name: String,
    pub(crate) expires_at: Option<i64>,
}

impl WriteInput {
    /// Serialize an item and stamp it with the expiry, if any.
    pub(crate) fn prepare_item<T: Serialize>(&self, item: T) -> Result<common::RawItem> {
        let mut item = common::to_raw_item(item)?;
        if let Some(expires_at) = self.expires_at {
            item.insert(
                common::expiry::EXPIRES_ATTRIBUTE.to_string(),
                expires_at.into(),
            );
        }
        Ok(item)
    }
}

/// Arguments common to item-creating write operations (Put, Insert).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteArgs {
    /// The name of the Base to write to.
    pub base_name: String,
    /// When the written items should expire.
    ///
    /// If `None`, the items never expire.
    pub expiry: Option<common::expiry::Expiry>,
}

impl TryFrom<WriteArgs> for WriteInput {
    type Error = crate::Error;

    fn try_from(write_args: WriteArgs) -> Result<Self> {
        let expires_at = match write_args.expiry {
            Some(expiry) => Some(expiry.timestamp()?),
            None => None,
        };
        let operation = Self {
            base_name: write_args.base_name,
            expires_at,
        };
        Ok(operation)
    }
}
