//! The core type system for Floe.
//!
//! This crate defines the type lattice (primitive and nested types with
//! integer field ids), immutable [`Schema`]s with derived name/id indexes,
//! the visitor framework used by every tree operation, projection operations
//! over schemas, batched [`SchemaUpdate`] evolution, and the schema JSON
//! interchange format.

pub use decimal::*;
pub use evolution::*;
pub use field::*;
pub use index::*;
pub use schema::*;
pub use select::*;
pub use struct_::*;
pub use types::*;
pub use visit::*;

mod decimal;
mod evolution;
mod field;
mod index;
mod json;
mod schema;
mod select;
mod struct_;
mod types;
mod visit;

pub use json::{type_from_json, type_to_json};
