//! Common utilities for Deta Base operations.
//!
//! This module provides shared types and utilities used across read and write operations,
//! including item keys, query conditions, attribute selection and item expiry.

/// Query condition building for filtered reads.
pub mod condition;

/// Expiry (time to live) for written items.
pub mod expiry;

/// Key type for identifying items in a Base.
pub mod key;

/// Attribute selection for field paths.
pub mod selection;

use crate::{Error, Result};

use serde::Serialize;
use serde_json::{Map, Value};

/// A stored item as the service sees it: a JSON object of attribute name to value.
pub type RawItem = Map<String, Value>;

/// Separator for nested attribute path components.
pub(crate) const PATH_SEPARATOR: &str = ".";

pub(crate) fn add_path(keys: &[String], name: &str) -> Vec<String> {
    let mut new_keys = Vec::with_capacity(keys.len() + 1);
    new_keys.extend_from_slice(keys);
    new_keys.push(name.to_string());
    new_keys
}

/// Serialize a value into a [`RawItem`], rejecting anything that isn't a JSON object.
pub fn to_raw_item<T: Serialize>(value: T) -> Result<RawItem> {
    match serde_json::to_value(value)? {
        Value::Object(item) => Ok(item),
        other => Err(Error::NotAnObject(other)),
    }
}

/// Types that can be built from an item returned by the service.
pub trait FromItem: Sized {
    /// Build `Self` from a raw item.
    fn from_item(item: RawItem) -> Self;
}

impl FromItem for RawItem {
    fn from_item(item: RawItem) -> Self {
        item
    }
}
