#![deny(missing_docs)]
#![deny(warnings)]

//! # Deta Base CRUD
//!
//! A typed, ergonomic interface for storing and querying items in Deta Base.
//!
//! ## Overview
//!
//! This library maps Rust models onto the Deta Base HTTP API:
//! - Models declare their Base name, defaults and fields once
//! - Fields build query conditions and update expressions, checked by the compiler
//! - Updates return the item as the service will store it, without a second read
//! - Pagination cursors are followed for you
//!
//! ## Quick Example
//!
//! ```no_run
//! use deta_base_crud::{
//!     client::{Client, ClientArgs},
//!     model::{base::Base, field::Field, item::Item},
//!     write::update_item::UpdateExpressionMap,
//! };
//!
//! struct User;
//!
//! impl User {
//!     const NAME: Field<String> = Field::new("name");
//!     const AGE: Field<u32> = Field::new("age");
//!     const TAGS: Field<Vec<String>> = Field::new("tags");
//! }
//!
//! impl Base for User {
//!     const NAME: &'static str = "users";
//! }
//!
//! # async fn example() -> deta_base_crud::Result<()> {
//! // The project key is read from DETA_PROJECT_KEY when not given
//! let mut client = Client::new(ClientArgs {
//!     bases: vec![<User as Base>::NAME.to_string()],
//!     ..Default::default()
//! })?;
//! client.open()?;
//! let users = client.base::<User>()?;
//!
//! let jane = users
//!     .insert(Item::new().with(&User::NAME, "Jane").with(&User::AGE, 30u32))
//!     .await?;
//! let jane = users
//!     .update(
//!         &jane,
//!         UpdateExpressionMap::Combined(vec![
//!             User::AGE.increment(1u32),
//!             User::TAGS.append(vec!["admin".to_string()]),
//!         ]),
//!     )
//!     .await?;
//! let adults = users
//!     .query_all(Some(User::AGE.greater_than_or_equal(18u32) & User::NAME.begins_with("J")))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@client`] - Connection to a Deta project
//! - [`mod@model`] - Bases, fields and items
//! - [`mod@common`] - Shared utilities for keys, conditions, expiry and selections
//! - [`mod@read`] - Read operations (GetItem, Query)
//! - [`mod@write`] - Write operations (PutItems, InsertItem, UpdateItem, DeleteItem)

/// Connection to a Deta project: credentials, registered Bases and the HTTP session.
pub mod client;

/// Common utilities for keys, conditions, expiry and attribute selection.
pub mod common;

mod error;

/// Typed models: Bases, their fields and their items.
pub mod model;

/// Read operations for retrieving items from a Base.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Querying items with conditions, one page at a time or all at once
pub mod read;

/// Write operations for modifying items in a Base.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Inserting items whose key must not exist yet
/// - Updating items with various operations (set, increment, append, prepend, delete)
/// - Deleting items by key
pub mod write;

pub use error::{Error, Result};
