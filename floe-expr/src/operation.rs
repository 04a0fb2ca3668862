use std::fmt::{Display, Formatter};

/// A predicate operation. `IsNull`/`NotNull` carry no literal; every other
/// operation carries exactly one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// The referenced value is null.
    IsNull,
    /// The referenced value is not null.
    NotNull,
    /// Strictly less than the literal.
    Lt,
    /// Less than or equal to the literal.
    LtEq,
    /// Strictly greater than the literal.
    Gt,
    /// Greater than or equal to the literal.
    GtEq,
    /// Equal to the literal.
    Eq,
    /// Not equal to the literal.
    NotEq,
}

impl Operation {
    /// The operation satisfied exactly when this one is not.
    pub fn negate(self) -> Operation {
        match self {
            Operation::IsNull => Operation::NotNull,
            Operation::NotNull => Operation::IsNull,
            Operation::Lt => Operation::GtEq,
            Operation::LtEq => Operation::Gt,
            Operation::Gt => Operation::LtEq,
            Operation::GtEq => Operation::Lt,
            Operation::Eq => Operation::NotEq,
            Operation::NotEq => Operation::Eq,
        }
    }

    /// Whether the operation carries no literal.
    pub fn is_unary(self) -> bool {
        matches!(self, Operation::IsNull | Operation::NotNull)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Operation::IsNull => "is null",
            Operation::NotNull => "is not null",
            Operation::Lt => "<",
            Operation::LtEq => "<=",
            Operation::Gt => ">",
            Operation::GtEq => ">=",
            Operation::Eq => "=",
            Operation::NotEq => "!=",
        };
        Display::fmt(display, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_is_an_involution() {
        let ops = [
            Operation::IsNull,
            Operation::NotNull,
            Operation::Lt,
            Operation::LtEq,
            Operation::Gt,
            Operation::GtEq,
            Operation::Eq,
            Operation::NotEq,
        ];
        for op in ops {
            assert_eq!(op.negate().negate(), op);
        }
        assert_eq!(Operation::Lt.negate(), Operation::GtEq);
        assert_eq!(Operation::Eq.negate(), Operation::NotEq);
        assert_eq!(Operation::IsNull.negate(), Operation::NotNull);
    }
}
