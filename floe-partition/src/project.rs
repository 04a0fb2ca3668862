//! Projection of row-space predicates into partition space.
//!
//! An inclusive projection over-approximates: every row satisfying the
//! original predicate lands in a partition satisfying the projection, so it
//! is safe for pruning files. A strict projection under-approximates: every
//! row in a satisfying partition satisfies the original predicate, so it is
//! safe for skipping filter evaluation entirely.

use tracing::trace;

use floe_error::{FloeResult, floe_panic};
use floe_expr::{BoundExpr, BoundPredicate, Expr, UnboundExpr};

use crate::PartitionSpecRef;

/// Entry points for building projection evaluators over a spec.
pub struct Projections;

impl Projections {
    /// An over-approximating projection for pruning.
    pub fn inclusive(spec: PartitionSpecRef) -> InclusiveProjection {
        InclusiveProjection { spec }
    }

    /// An under-approximating projection for filter elimination.
    pub fn strict(spec: PartitionSpecRef) -> StrictProjection {
        StrictProjection { spec }
    }
}

fn project_predicate(
    spec: &PartitionSpecRef,
    predicate: &BoundPredicate,
    strict: bool,
) -> FloeResult<UnboundExpr> {
    // each matching partition field contributes a partition-space predicate
    // when its transform can project; a transform that cannot contributes
    // the fold identity (true for the inclusive AND, false for the strict OR)
    let mut result = if strict { Expr::False } else { Expr::True };
    for field in spec.fields_for_source(predicate.reference().field_id()) {
        let projected = if strict {
            field.transform().project_strict(field.name(), predicate)?
        } else {
            field.transform().project(field.name(), predicate)?
        };
        if let Some(projected) = projected {
            result = if strict {
                Expr::or(result, Expr::Pred(projected))
            } else {
                Expr::and(result, Expr::Pred(projected))
            };
        }
    }
    Ok(result)
}

fn project_expr(
    spec: &PartitionSpecRef,
    expr: &BoundExpr,
    strict: bool,
) -> FloeResult<UnboundExpr> {
    Ok(match expr {
        Expr::True => Expr::True,
        Expr::False => Expr::False,
        Expr::And(left, right) => Expr::and(
            project_expr(spec, left, strict)?,
            project_expr(spec, right, strict)?,
        ),
        Expr::Or(left, right) => Expr::or(
            project_expr(spec, left, strict)?,
            project_expr(spec, right, strict)?,
        ),
        Expr::Not(_) => floe_panic!("negation must be rewritten away before projection"),
        Expr::Pred(predicate) => project_predicate(spec, predicate, strict)?,
    })
}

/// Rewrites row predicates into an over-approximating partition predicate.
#[derive(Debug, Clone)]
pub struct InclusiveProjection {
    spec: PartitionSpecRef,
}

impl InclusiveProjection {
    /// Project a row-space expression. The result is an unbound expression
    /// over partition column names; bind it against the spec's partition
    /// struct to evaluate it.
    pub fn project(&self, expr: &UnboundExpr) -> FloeResult<UnboundExpr> {
        let bound = expr.bind(self.spec.schema())?.rewrite_not();
        let projected = project_expr(&self.spec, &bound, false)?;
        trace!(%projected, "inclusive projection");
        Ok(projected)
    }
}

/// Rewrites row predicates into an under-approximating partition predicate.
#[derive(Debug, Clone)]
pub struct StrictProjection {
    spec: PartitionSpecRef,
}

impl StrictProjection {
    /// Project a row-space expression. The result is an unbound expression
    /// over partition column names; bind it against the spec's partition
    /// struct to evaluate it.
    pub fn project(&self, expr: &UnboundExpr) -> FloeResult<UnboundExpr> {
        let bound = expr.bind(self.spec.schema())?.rewrite_not();
        let projected = project_expr(&self.spec, &bound, true)?;
        trace!(%projected, "strict projection");
        Ok(projected)
    }
}
