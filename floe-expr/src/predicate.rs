use std::fmt::{Display, Formatter};

use floe_error::{FloeResult, floe_bail, floe_panic};
use floe_literal::{Conversion, Literal};
use floe_schema::{FieldName, NestedFieldRef, Schema};

use crate::expr::{BoundExpr, Expr, Negate};
use crate::{BoundReference, NamedReference, Operation};

/// A predicate over a column name with a raw literal, before binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundPredicate {
    op: Operation,
    term: NamedReference,
    literal: Option<Literal>,
}

impl UnboundPredicate {
    /// A null-check predicate; `op` must be unary.
    pub fn unary(op: Operation, name: impl Into<FieldName>) -> Self {
        if !op.is_unary() {
            floe_panic!(InvalidArgument: "operation {} requires a literal", op);
        }
        Self {
            op,
            term: NamedReference::new(name),
            literal: None,
        }
    }

    /// A comparison predicate carrying exactly one literal.
    pub fn binary(op: Operation, name: impl Into<FieldName>, literal: Literal) -> Self {
        if op.is_unary() {
            floe_panic!(InvalidArgument: "operation {} does not take a literal", op);
        }
        Self {
            op,
            term: NamedReference::new(name),
            literal: Some(literal),
        }
    }

    /// The predicate operation.
    pub fn op(&self) -> Operation {
        self.op
    }

    /// The referenced column.
    pub fn term(&self) -> &NamedReference {
        &self.term
    }

    /// The raw literal, absent for null checks.
    pub fn literal(&self) -> Option<&Literal> {
        self.literal.as_ref()
    }

    /// Resolve the name against `schema` and convert the literal to the
    /// field's type, folding to a constant where the conversion proves the
    /// predicate (see the sentinel rules) or where a null check is decided
    /// by the field's optionality.
    pub fn bind(&self, schema: &Schema) -> FloeResult<BoundExpr> {
        let Some(field) = schema.find_field(self.term.name()) else {
            floe_bail!("cannot find field '{}' in schema: {}", self.term.name(), schema);
        };
        let field = NestedFieldRef::clone(field);

        if self.op.is_unary() {
            if field.is_required() {
                // a required field is never null
                return Ok(match self.op {
                    Operation::IsNull => Expr::False,
                    Operation::NotNull => Expr::True,
                    _ => floe_panic!("operation {} is not unary", self.op),
                });
            }
            return Ok(Expr::Pred(BoundPredicate {
                op: self.op,
                reference: BoundReference::new(field),
                literal: None,
            }));
        }

        let Some(literal) = self.literal.as_ref() else {
            floe_bail!("operation {} requires a literal", self.op);
        };
        let Some(converted) = literal.to(field.field_type()) else {
            floe_bail!(
                "invalid value for conversion to type {}: {} ({})",
                field.field_type(),
                literal,
                self.term.name()
            );
        };
        let literal = match converted {
            Conversion::AboveMax => {
                // the value is beyond the type's maximum, so the comparison
                // is decided without evaluating rows
                return Ok(match self.op {
                    Operation::Lt | Operation::LtEq | Operation::NotEq => Expr::True,
                    Operation::Gt | Operation::GtEq | Operation::Eq => Expr::False,
                    _ => floe_panic!("operation {} is unary", self.op),
                });
            }
            Conversion::BelowMin => {
                return Ok(match self.op {
                    Operation::Gt | Operation::GtEq | Operation::NotEq => Expr::True,
                    Operation::Lt | Operation::LtEq | Operation::Eq => Expr::False,
                    _ => floe_panic!("operation {} is unary", self.op),
                });
            }
            Conversion::Literal(literal) => literal,
        };
        Ok(Expr::Pred(BoundPredicate {
            op: self.op,
            reference: BoundReference::new(field),
            literal: Some(literal),
        }))
    }
}

impl Negate for UnboundPredicate {
    fn negated(&self) -> Self {
        Self {
            op: self.op.negate(),
            term: self.term.clone(),
            literal: self.literal.clone(),
        }
    }
}

impl Display for UnboundPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "({} {} {})", self.term, self.op, literal),
            None => write!(f, "({} {})", self.term, self.op),
        }
    }
}

/// A predicate over a resolved field, whose literal has the field's exact
/// type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundPredicate {
    op: Operation,
    reference: BoundReference,
    literal: Option<Literal>,
}

impl BoundPredicate {
    /// The predicate operation.
    pub fn op(&self) -> Operation {
        self.op
    }

    /// The resolved reference.
    pub fn reference(&self) -> &BoundReference {
        &self.reference
    }

    /// The typed literal, absent for null checks.
    pub fn literal(&self) -> Option<&Literal> {
        self.literal.as_ref()
    }
}

impl Negate for BoundPredicate {
    fn negated(&self) -> Self {
        Self {
            op: self.op.negate(),
            reference: self.reference.clone(),
            literal: self.literal.clone(),
        }
    }
}

impl Display for BoundPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "({} {} {})", self.reference, self.op, literal),
            None => write!(f, "({} {})", self.reference, self.op),
        }
    }
}

#[cfg(test)]
mod tests {
    use floe_schema::{NestedField, PrimitiveType, Type};

    use super::*;
    use crate::{
        equal, greater_than, is_null, less_than, less_than_or_equal, not_null, not_equal,
    };

    fn schema() -> Schema {
        Schema::new(vec![
            NestedField::required(1, "id", PrimitiveType::Int.into()),
            NestedField::optional(2, "data", PrimitiveType::String.into()),
            NestedField::optional(3, "ratio", PrimitiveType::Float.into()),
        ])
        .unwrap()
    }

    #[test]
    fn bind_resolves_names_and_types() {
        let schema = schema();
        let bound = equal("id", 34i64).bind(&schema).unwrap();
        let Expr::Pred(pred) = bound else {
            panic!("expected a predicate");
        };
        assert_eq!(pred.reference().field_id(), 1);
        // the long literal was converted to the field's int type
        assert_eq!(pred.literal(), Some(&Literal::Int(34)));
        assert_eq!(
            pred.reference().field_type(),
            &Type::Primitive(PrimitiveType::Int)
        );
    }

    #[test]
    fn bind_missing_field_is_a_validation_error() {
        let err = equal("missing", 1).bind(&schema()).unwrap_err();
        assert!(err.to_string().contains("cannot find field 'missing'"));
    }

    #[test]
    fn bind_rejects_unconvertible_literals() {
        let err = equal("id", "not a number").bind(&schema()).unwrap_err();
        assert!(err.to_string().contains("invalid value for conversion"));
    }

    #[test]
    fn bind_folds_out_of_range_comparisons() {
        let schema = schema();
        // 9999999999 is above any int: every int is less than it
        assert_eq!(
            less_than("id", 9_999_999_999i64).bind(&schema).unwrap(),
            Expr::True
        );
        assert_eq!(
            less_than_or_equal("id", 9_999_999_999i64).bind(&schema).unwrap(),
            Expr::True
        );
        assert_eq!(
            not_equal("id", 9_999_999_999i64).bind(&schema).unwrap(),
            Expr::True
        );
        assert_eq!(
            greater_than("id", 9_999_999_999i64).bind(&schema).unwrap(),
            Expr::False
        );
        assert_eq!(
            equal("id", 9_999_999_999i64).bind(&schema).unwrap(),
            Expr::False
        );
        // and dually below the minimum
        assert_eq!(
            greater_than("id", -9_999_999_999i64).bind(&schema).unwrap(),
            Expr::True
        );
        assert_eq!(
            less_than("id", -9_999_999_999i64).bind(&schema).unwrap(),
            Expr::False
        );
    }

    #[test]
    fn bind_folds_null_checks_on_required_fields() {
        let schema = schema();
        assert_eq!(is_null("id").bind(&schema).unwrap(), Expr::False);
        assert_eq!(not_null("id").bind(&schema).unwrap(), Expr::True);
        // optional fields keep the predicate
        assert!(matches!(
            is_null("data").bind(&schema).unwrap(),
            Expr::Pred(_)
        ));
    }

    #[test]
    fn bind_recurses_and_folds_connectives() {
        let schema = schema();
        let expr = Expr::and(
            not_null("id"),
            Expr::or(equal("data", "x"), less_than("id", 9_999_999_999i64)),
        );
        // not_null(id) -> true, lt fold -> true, so the whole tree is true
        assert_eq!(expr.bind(&schema).unwrap(), Expr::True);
    }
}
