//! Write operations for modifying items in a Base.
//!
//! This module provides operations for writing data to Deta Base:
//! - Putting new items or replacing existing ones
//! - Inserting items that must not exist yet
//! - Updating items with various operations
//! - Deleting items by key

/// Common utilities and types for write operations.
pub mod common;

/// Delete item operation for removing items from a Base.
pub mod delete_item;

/// Insert item operation for creating items with a fresh key.
pub mod insert_item;

/// Put items operation for creating or replacing items in bulk.
pub mod put_item;

/// Update item operation for modifying existing items.
pub mod update_item;
