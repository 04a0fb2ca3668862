use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use jiff::civil;

use floe_error::{FloeError, FloeResult, floe_bail, floe_err, floe_panic};
use floe_expr::{BoundPredicate, Operation, UnboundPredicate};
use floe_literal::{Literal, decimal_unscaled_bytes, uuid_bytes};
use floe_schema::{PrimitiveType, Type};

use crate::murmur3::{hash_bytes, hash_long};

/// A pure, deterministic function from a source column value to a partition
/// value, with companion inclusive/strict projection operators.
///
/// Transforms are value types and compare by their parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Transform {
    /// The source value unchanged.
    Identity,
    /// Murmur3-based hash bucketing into `N` buckets.
    Bucket(u32),
    /// Value truncation to a width `W`: multiples of `W` for integers and
    /// decimals, a `W`-code-point prefix for strings, a `W`-byte prefix for
    /// binary.
    Truncate(u32),
    /// Years from 1970.
    Year,
    /// Months from 1970-01.
    Month,
    /// Days from 1970-01-01.
    Day,
    /// Hours from 1970-01-01T00:00:00.
    Hour,
}

impl Transform {
    /// Whether this transform accepts the given source type.
    pub fn can_transform(&self, source: &Type) -> bool {
        let Some(primitive) = source.as_primitive() else {
            return false;
        };
        match self {
            Transform::Identity => true,
            Transform::Bucket(_) => matches!(
                primitive,
                PrimitiveType::Int
                    | PrimitiveType::Long
                    | PrimitiveType::Date
                    | PrimitiveType::Time
                    | PrimitiveType::Timestamp
                    | PrimitiveType::Timestamptz
                    | PrimitiveType::String
                    | PrimitiveType::Uuid
                    | PrimitiveType::Fixed(_)
                    | PrimitiveType::Binary
                    | PrimitiveType::Decimal(_)
            ),
            Transform::Truncate(_) => matches!(
                primitive,
                PrimitiveType::Int
                    | PrimitiveType::Long
                    | PrimitiveType::String
                    | PrimitiveType::Binary
                    | PrimitiveType::Decimal(_)
            ),
            Transform::Year | Transform::Month | Transform::Day => matches!(
                primitive,
                PrimitiveType::Date | PrimitiveType::Timestamp | PrimitiveType::Timestamptz
            ),
            Transform::Hour => {
                matches!(
                    primitive,
                    PrimitiveType::Timestamp | PrimitiveType::Timestamptz
                )
            }
        }
    }

    /// The partition value type this transform produces for `source`.
    pub fn result_type(&self, source: &Type) -> FloeResult<Type> {
        if !self.can_transform(source) {
            floe_bail!(InvalidArgument: "cannot use {} with source type {}", self, source);
        }
        Ok(match self {
            Transform::Identity | Transform::Truncate(_) => source.clone(),
            Transform::Bucket(_)
            | Transform::Year
            | Transform::Month
            | Transform::Day
            | Transform::Hour => Type::Primitive(PrimitiveType::Int),
        })
    }

    /// Apply the transform to a source value.
    pub fn apply(&self, literal: &Literal) -> FloeResult<Literal> {
        match self {
            Transform::Identity => Ok(literal.clone()),
            Transform::Bucket(buckets) => {
                if *buckets == 0 {
                    floe_bail!(InvalidArgument: "bucket count must be positive");
                }
                let hash = bucket_hash(literal)?;
                Ok(Literal::Int(((hash & 0x7FFF_FFFF) as u32 % buckets) as i32))
            }
            Transform::Truncate(width) => truncate(*width, literal),
            Transform::Year => Ok(Literal::Int(
                epoch_ordinals(literal, self)?.0,
            )),
            Transform::Month => Ok(Literal::Int(
                epoch_ordinals(literal, self)?.1,
            )),
            Transform::Day => Ok(Literal::Int(
                epoch_ordinals(literal, self)?.2,
            )),
            Transform::Hour => match literal {
                Literal::Timestamp(micros) | Literal::Timestamptz(micros) => Ok(Literal::Int(
                    i32::try_from(micros.div_euclid(3_600_000_000))
                        .map_err(|_| floe_err!(InvalidArgument: "timestamp out of range"))?,
                )),
                other => floe_bail!(InvalidArgument: "cannot extract an hour from {}", other),
            },
        }
    }

    /// The inclusive projection of a bound predicate into partition space:
    /// over-approximating, safe for pruning files. `None` when this
    /// transform cannot prove anything for the operation.
    pub fn project(
        &self,
        name: &str,
        predicate: &BoundPredicate,
    ) -> FloeResult<Option<UnboundPredicate>> {
        if predicate.op().is_unary() {
            // these transforms all map null to null, so null checks carry over
            return Ok(Some(UnboundPredicate::unary(predicate.op(), name)));
        }
        let literal = bound_literal(predicate);
        match self {
            Transform::Identity => Ok(Some(UnboundPredicate::binary(
                predicate.op(),
                name,
                literal.clone(),
            ))),
            Transform::Bucket(_) => match predicate.op() {
                Operation::Eq => Ok(Some(UnboundPredicate::binary(
                    Operation::Eq,
                    name,
                    self.apply(literal)?,
                ))),
                _ => Ok(None),
            },
            _ => {
                let op = match predicate.op() {
                    Operation::Lt | Operation::LtEq => Operation::LtEq,
                    Operation::Gt | Operation::GtEq => Operation::GtEq,
                    Operation::Eq => Operation::Eq,
                    Operation::NotEq => return Ok(None),
                    unary => floe_panic!("operation {} carries no literal", unary),
                };
                Ok(Some(UnboundPredicate::binary(
                    op,
                    name,
                    self.apply(literal)?,
                )))
            }
        }
    }

    /// The strict projection of a bound predicate into partition space:
    /// under-approximating, safe for skipping filter evaluation. `None` when
    /// this transform cannot guarantee anything for the operation.
    pub fn project_strict(
        &self,
        name: &str,
        predicate: &BoundPredicate,
    ) -> FloeResult<Option<UnboundPredicate>> {
        if predicate.op().is_unary() {
            return Ok(Some(UnboundPredicate::unary(predicate.op(), name)));
        }
        let literal = bound_literal(predicate);
        match self {
            Transform::Identity => Ok(Some(UnboundPredicate::binary(
                predicate.op(),
                name,
                literal.clone(),
            ))),
            Transform::Bucket(_) => match predicate.op() {
                Operation::NotEq => Ok(Some(UnboundPredicate::binary(
                    Operation::NotEq,
                    name,
                    self.apply(literal)?,
                ))),
                _ => Ok(None),
            },
            _ => {
                let op = match predicate.op() {
                    Operation::Lt | Operation::LtEq => Operation::Lt,
                    Operation::Gt | Operation::GtEq => Operation::Gt,
                    Operation::NotEq => Operation::NotEq,
                    Operation::Eq => return Ok(None),
                    unary => floe_panic!("operation {} carries no literal", unary),
                };
                Ok(Some(UnboundPredicate::binary(
                    op,
                    name,
                    self.apply(literal)?,
                )))
            }
        }
    }
}

fn bound_literal(predicate: &BoundPredicate) -> &Literal {
    match predicate.literal() {
        Some(literal) => literal,
        None => floe_panic!("bound predicate {} is missing its literal", predicate),
    }
}

fn bucket_hash(literal: &Literal) -> FloeResult<i32> {
    Ok(match literal {
        Literal::Int(v) => hash_long(i64::from(*v)),
        Literal::Date(days) => hash_long(i64::from(*days)),
        Literal::Long(v) | Literal::Time(v) | Literal::Timestamp(v) | Literal::Timestamptz(v) => {
            hash_long(*v)
        }
        Literal::String(s) => hash_bytes(s.as_bytes()),
        Literal::Uuid(uuid) => hash_bytes(&uuid_bytes(uuid)),
        Literal::Fixed(bytes) | Literal::Binary(bytes) => hash_bytes(bytes),
        Literal::Decimal(value) => hash_bytes(&decimal_unscaled_bytes(value.unscaled())),
        other => floe_bail!(InvalidArgument: "cannot bucket by value: {}", other),
    })
}

fn truncate(width: u32, literal: &Literal) -> FloeResult<Literal> {
    if width == 0 {
        floe_bail!(InvalidArgument: "truncate width must be positive");
    }
    Ok(match literal {
        Literal::Int(v) => {
            let width = i32::try_from(width)
                .map_err(|_| floe_err!(InvalidArgument: "truncate width too large for int"))?;
            Literal::Int(v - v.rem_euclid(width))
        }
        Literal::Long(v) => {
            let width = i64::from(width);
            Literal::Long(v - v.rem_euclid(width))
        }
        Literal::Decimal(value) => {
            let width = i128::from(width);
            Literal::decimal(
                value.unscaled() - value.unscaled().rem_euclid(width),
                value.scale(),
            )
        }
        Literal::String(s) => {
            let width = width as usize;
            if s.chars().count() <= width {
                Literal::String(Arc::clone(s))
            } else {
                let prefix: String = s.chars().take(width).collect();
                Literal::from(prefix)
            }
        }
        Literal::Binary(bytes) => {
            let width = width as usize;
            if bytes.len() <= width {
                Literal::Binary(bytes.clone())
            } else {
                Literal::Binary(bytes.slice(..width))
            }
        }
        other => floe_bail!(InvalidArgument: "cannot truncate value: {}", other),
    })
}

// (years, months, days) from the epoch for a date or timestamp value, with
// floor semantics before the epoch
fn epoch_ordinals(literal: &Literal, transform: &Transform) -> FloeResult<(i32, i32, i32)> {
    let days = match literal {
        Literal::Date(days) => *days,
        Literal::Timestamp(micros) | Literal::Timestamptz(micros) => {
            i32::try_from(micros.div_euclid(86_400_000_000))
                .map_err(|_| floe_err!(InvalidArgument: "timestamp out of range"))?
        }
        other => floe_bail!(InvalidArgument: "cannot apply {} to value: {}", transform, other),
    };
    let epoch = civil::date(1970, 1, 1);
    let date = epoch
        .checked_add(
            jiff::Span::new()
                .try_days(i64::from(days))
                .map_err(|e| floe_err!(InvalidArgument: "day ordinal out of range: {}", e))?,
        )
        .map_err(|e| floe_err!(InvalidArgument: "day ordinal out of range: {}", e))?;
    let years = i32::from(date.year()) - 1970;
    let months = years * 12 + (i32::from(date.month()) - 1);
    Ok((years, months, days))
}

impl Display for Transform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::Identity => write!(f, "identity"),
            Transform::Bucket(buckets) => write!(f, "bucket[{}]", buckets),
            Transform::Truncate(width) => write!(f, "truncate[{}]", width),
            Transform::Year => write!(f, "year"),
            Transform::Month => write!(f, "month"),
            Transform::Day => write!(f, "day"),
            Transform::Hour => write!(f, "hour"),
        }
    }
}

impl FromStr for Transform {
    type Err = FloeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(Transform::Identity),
            "year" => Ok(Transform::Year),
            "month" => Ok(Transform::Month),
            "day" => Ok(Transform::Day),
            "hour" => Ok(Transform::Hour),
            _ => {
                let parse_arg = |arg: &str| -> FloeResult<u32> {
                    let value = arg
                        .parse::<u32>()
                        .map_err(|_| floe_err!("invalid transform: {}", s))?;
                    if value == 0 {
                        floe_bail!("invalid transform, parameter must be positive: {}", s);
                    }
                    Ok(value)
                };
                if let Some(arg) = s.strip_prefix("bucket[").and_then(|r| r.strip_suffix(']')) {
                    return Ok(Transform::Bucket(parse_arg(arg)?));
                }
                if let Some(arg) = s.strip_prefix("truncate[").and_then(|r| r.strip_suffix(']')) {
                    return Ok(Transform::Truncate(parse_arg(arg)?));
                }
                floe_bail!("unknown transform: {}", s)
            }
        }
    }
}
