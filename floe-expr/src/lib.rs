//! Predicate expressions for Floe.
//!
//! Expressions are closed-sum trees ([`Expr`]) over either name-based
//! [`UnboundPredicate`]s or schema-resolved [`BoundPredicate`]s. Binding
//! resolves names to field ids, converts literals to the referenced field's
//! type, and folds predicates that a conversion sentinel or a required field
//! already decides.

pub use evaluate::*;
pub use expr::*;
pub use operation::*;
pub use predicate::*;
pub use reference::*;

mod evaluate;
mod expr;
mod operation;
mod predicate;
mod reference;

use floe_literal::Literal;
use floe_schema::FieldName;

/// An expression that is always satisfied.
pub fn always_true() -> UnboundExpr {
    Expr::True
}

/// An expression that is never satisfied.
pub fn always_false() -> UnboundExpr {
    Expr::False
}

/// Conjunction of two expressions.
pub fn and<P>(left: Expr<P>, right: Expr<P>) -> Expr<P> {
    Expr::and(left, right)
}

/// Disjunction of two expressions.
pub fn or<P>(left: Expr<P>, right: Expr<P>) -> Expr<P> {
    Expr::or(left, right)
}

/// Complement of an expression.
pub fn not<P>(expr: Expr<P>) -> Expr<P> {
    Expr::not(expr)
}

/// The named column is null.
pub fn is_null(name: impl Into<FieldName>) -> UnboundExpr {
    Expr::Pred(UnboundPredicate::unary(Operation::IsNull, name))
}

/// The named column is not null.
pub fn not_null(name: impl Into<FieldName>) -> UnboundExpr {
    Expr::Pred(UnboundPredicate::unary(Operation::NotNull, name))
}

/// The named column is less than the literal.
pub fn less_than(name: impl Into<FieldName>, literal: impl Into<Literal>) -> UnboundExpr {
    Expr::Pred(UnboundPredicate::binary(Operation::Lt, name, literal.into()))
}

/// The named column is less than or equal to the literal.
pub fn less_than_or_equal(name: impl Into<FieldName>, literal: impl Into<Literal>) -> UnboundExpr {
    Expr::Pred(UnboundPredicate::binary(
        Operation::LtEq,
        name,
        literal.into(),
    ))
}

/// The named column is greater than the literal.
pub fn greater_than(name: impl Into<FieldName>, literal: impl Into<Literal>) -> UnboundExpr {
    Expr::Pred(UnboundPredicate::binary(Operation::Gt, name, literal.into()))
}

/// The named column is greater than or equal to the literal.
pub fn greater_than_or_equal(
    name: impl Into<FieldName>,
    literal: impl Into<Literal>,
) -> UnboundExpr {
    Expr::Pred(UnboundPredicate::binary(
        Operation::GtEq,
        name,
        literal.into(),
    ))
}

/// The named column equals the literal.
pub fn equal(name: impl Into<FieldName>, literal: impl Into<Literal>) -> UnboundExpr {
    Expr::Pred(UnboundPredicate::binary(Operation::Eq, name, literal.into()))
}

/// The named column does not equal the literal.
pub fn not_equal(name: impl Into<FieldName>, literal: impl Into<Literal>) -> UnboundExpr {
    Expr::Pred(UnboundPredicate::binary(
        Operation::NotEq,
        name,
        literal.into(),
    ))
}
