use std::fmt::{Display, Formatter};

use floe_error::FloeResult;
use floe_schema::Schema;

use crate::{BoundPredicate, UnboundPredicate};

/// Predicates that can flip to their logical complement. Negating an
/// expression pushes negation down to its predicates through this trait.
pub trait Negate {
    /// The predicate satisfied exactly when this one is not.
    fn negated(&self) -> Self;
}

/// An algebraic predicate expression over predicates of kind `P`.
///
/// Expressions are immutable trees; the smart constructors [`Expr::and`],
/// [`Expr::or`] and [`Expr::not`] fold constants as they build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<P> {
    /// Always satisfied.
    True,
    /// Never satisfied.
    False,
    /// Both children are satisfied.
    And(Box<Expr<P>>, Box<Expr<P>>),
    /// At least one child is satisfied.
    Or(Box<Expr<P>>, Box<Expr<P>>),
    /// The child is not satisfied.
    Not(Box<Expr<P>>),
    /// A leaf predicate.
    Pred(P),
}

/// An expression over name-based predicates with raw literals.
pub type UnboundExpr = Expr<UnboundPredicate>;

/// An expression over id-based predicates with literals typed exactly as the
/// fields they compare against.
pub type BoundExpr = Expr<BoundPredicate>;

impl<P> Expr<P> {
    /// Conjunction, folding `true`/`false` children.
    pub fn and(left: Expr<P>, right: Expr<P>) -> Expr<P> {
        match (left, right) {
            (Expr::False, _) | (_, Expr::False) => Expr::False,
            (Expr::True, other) | (other, Expr::True) => other,
            (left, right) => Expr::And(Box::new(left), Box::new(right)),
        }
    }

    /// Disjunction, folding `true`/`false` children.
    pub fn or(left: Expr<P>, right: Expr<P>) -> Expr<P> {
        match (left, right) {
            (Expr::True, _) | (_, Expr::True) => Expr::True,
            (Expr::False, other) | (other, Expr::False) => other,
            (left, right) => Expr::Or(Box::new(left), Box::new(right)),
        }
    }

    /// Logical complement, folding constants and double negation.
    pub fn not(expr: Expr<P>) -> Expr<P> {
        match expr {
            Expr::True => Expr::False,
            Expr::False => Expr::True,
            Expr::Not(inner) => *inner,
            other => Expr::Not(Box::new(other)),
        }
    }
}

impl<P: Negate + Clone> Expr<P> {
    /// The logical complement of this expression, with negation pushed down
    /// to the predicates (De Morgan) and double negation removed.
    pub fn negate(&self) -> Expr<P> {
        match self {
            Expr::True => Expr::False,
            Expr::False => Expr::True,
            Expr::And(left, right) => Expr::or(left.negate(), right.negate()),
            Expr::Or(left, right) => Expr::and(left.negate(), right.negate()),
            Expr::Not(inner) => (**inner).clone(),
            Expr::Pred(predicate) => Expr::Pred(predicate.negated()),
        }
    }

    /// Rewrite to negation-normal form: the result contains no `Not` nodes.
    pub fn rewrite_not(&self) -> Expr<P> {
        match self {
            Expr::Not(inner) => inner.rewrite_not().negate(),
            Expr::And(left, right) => Expr::and(left.rewrite_not(), right.rewrite_not()),
            Expr::Or(left, right) => Expr::or(left.rewrite_not(), right.rewrite_not()),
            other => other.clone(),
        }
    }
}

impl UnboundExpr {
    /// Resolve names to fields and literals to the field types, folding
    /// subtrees that become constant. After binding, every reference is a
    /// [`crate::BoundReference`] and every literal's type equals the
    /// referenced field's type.
    pub fn bind(&self, schema: &Schema) -> FloeResult<BoundExpr> {
        Ok(match self {
            Expr::True => Expr::True,
            Expr::False => Expr::False,
            Expr::And(left, right) => BoundExpr::and(left.bind(schema)?, right.bind(schema)?),
            Expr::Or(left, right) => BoundExpr::or(left.bind(schema)?, right.bind(schema)?),
            Expr::Not(inner) => BoundExpr::not(inner.bind(schema)?),
            Expr::Pred(predicate) => predicate.bind(schema)?,
        })
    }
}

impl<P: Display> Display for Expr<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::True => write!(f, "true"),
            Expr::False => write!(f, "false"),
            Expr::And(left, right) => write!(f, "({} and {})", left, right),
            Expr::Or(left, right) => write!(f, "({} or {})", left, right),
            Expr::Not(inner) => write!(f, "(not {})", inner),
            Expr::Pred(predicate) => Display::fmt(predicate, f),
        }
    }
}
