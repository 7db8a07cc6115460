//! Typed models on top of the raw operations.
//!
//! A model is a type implementing [`base::Base`]; its attributes are declared as
//! [`field::Field`] constants, and its stored records are [`item::Item`]s.

/// The `Base` trait and the typed operations of a registered Base.
pub mod base;

/// Typed attributes building conditions and update expressions.
pub mod field;

/// Items of a Base.
pub mod item;
