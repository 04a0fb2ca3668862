//! Evaluation of bound expressions against single rows.
//!
//! Rows come from the opaque record reader as anything implementing
//! [`StructLike`]: a lookup from field id to literal value, where `None`
//! means null.

use std::cmp::Ordering;
use std::collections::HashMap;

use floe_error::floe_panic;
use floe_literal::Literal;

use crate::{BoundExpr, BoundPredicate, Expr, Operation};

/// A row shaped by a projected schema: values addressable by field id.
pub trait StructLike {
    /// The value of the field with the given id, or `None` when null.
    fn field(&self, field_id: i32) -> Option<Literal>;
}

impl StructLike for HashMap<i32, Literal> {
    fn field(&self, field_id: i32) -> Option<Literal> {
        self.get(&field_id).cloned()
    }
}

/// Evaluates a bound expression against rows.
#[derive(Debug, Clone)]
pub struct Evaluator {
    expr: BoundExpr,
}

impl Evaluator {
    /// Create an evaluator for a bound expression.
    pub fn new(expr: BoundExpr) -> Self {
        Self { expr }
    }

    /// Whether `row` satisfies the expression. Null values fail every
    /// comparison and satisfy only `IsNull`.
    pub fn eval(&self, row: &dyn StructLike) -> bool {
        eval_expr(&self.expr, row)
    }
}

fn eval_expr(expr: &BoundExpr, row: &dyn StructLike) -> bool {
    match expr {
        Expr::True => true,
        Expr::False => false,
        Expr::And(left, right) => eval_expr(left, row) && eval_expr(right, row),
        Expr::Or(left, right) => eval_expr(left, row) || eval_expr(right, row),
        Expr::Not(inner) => !eval_expr(inner, row),
        Expr::Pred(predicate) => eval_predicate(predicate, row),
    }
}

fn eval_predicate(predicate: &BoundPredicate, row: &dyn StructLike) -> bool {
    let value = row.field(predicate.reference().field_id());
    match predicate.op() {
        Operation::IsNull => value.is_none(),
        Operation::NotNull => value.is_some(),
        op => {
            let Some(value) = value else {
                return false;
            };
            let Some(literal) = predicate.literal() else {
                floe_panic!("bound predicate {} is missing its literal", predicate);
            };
            match op {
                Operation::Lt => value.partial_cmp(literal) == Some(Ordering::Less),
                Operation::LtEq => matches!(
                    value.partial_cmp(literal),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                Operation::Gt => value.partial_cmp(literal) == Some(Ordering::Greater),
                Operation::GtEq => matches!(
                    value.partial_cmp(literal),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                Operation::Eq => value == *literal,
                Operation::NotEq => value != *literal,
                Operation::IsNull | Operation::NotNull => {
                    floe_panic!("unary operation {} already handled", op)
                }
            }
        }
    }
}
