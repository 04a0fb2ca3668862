//! Floe: the typed schema, expression and partitioning core of an
//! Iceberg-style table format.
//!
//! The member crates are re-exported here both as modules and, for the
//! common types, at the crate root:
//!
//! - [`schema`]: the type lattice, schemas with stable field ids, visitors,
//!   projection operations and batched evolution.
//! - [`literal`]: typed literal values and the conversion lattice with its
//!   above-max/below-min sentinels.
//! - [`expr`]: algebraic predicate expressions, binding and row evaluation.
//! - [`partition`]: partition transforms, specs and inclusive/strict
//!   predicate projection.
//! - [`error`]: the error type and its helper macros.

pub use floe_error as error;
pub use floe_expr as expr;
pub use floe_literal as literal;
pub use floe_partition as partition;
pub use floe_schema as schema;

pub use floe_error::{FloeError, FloeResult};
pub use floe_expr::{BoundExpr, BoundPredicate, Evaluator, Expr, Operation, UnboundExpr};
pub use floe_literal::{Conversion, Literal};
pub use floe_partition::{PartitionSpec, PartitionSpecRef, Projections, Transform};
pub use floe_schema::{
    NestedField, PrimitiveType, Schema, SchemaRef, SchemaUpdate, StructType, Type,
};
