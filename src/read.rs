//! Read operations for retrieving items from a Base.
//!
//! This module provides operations for reading data from Deta Base:
//! - Getting individual items by key
//! - Querying items with conditions, following pagination cursors

/// Common utilities and types for read operations.
pub mod common;

/// Get item operation for retrieving a single item by key.
pub mod get_item;

/// Query operation for retrieving items matching conditions.
pub mod query;
