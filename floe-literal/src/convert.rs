//! The literal conversion lattice.
//!
//! [`Literal::to`] is a partial function over the type lattice: `None` means
//! the conversion is disallowed, [`Conversion::AboveMax`]/
//! [`Conversion::BelowMin`] mean the source value falls outside the target's
//! representable range. Conversion never errors; expression binding decides
//! whether a failed conversion folds or raises.

use jiff::civil;
use jiff::tz::TimeZone;
use uuid::Uuid;

use floe_schema::{DecimalType, PrimitiveType, Type};

use crate::literal::{DecimalValue, Literal, ParsedDecimal, parse_decimal};

/// The result of a permitted conversion: a concrete literal, or a sentinel
/// marking that the value overflowed the target domain. Sentinels carry no
/// value; binding uses them to fold comparisons to `true`/`false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// The converted literal.
    Literal(Literal),
    /// The source value is larger than every value of the target type.
    AboveMax,
    /// The source value is smaller than every value of the target type.
    BelowMin,
}

impl Conversion {
    fn out_of_range(negative: bool) -> Self {
        if negative {
            Conversion::BelowMin
        } else {
            Conversion::AboveMax
        }
    }

    /// The converted literal, if the value was in range.
    pub fn literal(self) -> Option<Literal> {
        match self {
            Conversion::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// A reference to the converted literal, if the value was in range.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Conversion::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Whether the conversion overflowed the target's maximum.
    pub fn is_above_max(&self) -> bool {
        matches!(self, Conversion::AboveMax)
    }

    /// Whether the conversion underflowed the target's minimum.
    pub fn is_below_min(&self) -> bool {
        matches!(self, Conversion::BelowMin)
    }
}

impl Literal {
    /// Convert this literal to `target`.
    ///
    /// Returns `None` iff the conversion is disallowed by the lattice (or the
    /// source value cannot be parsed as the target). Converting to the
    /// literal's own type returns an identical literal without rebuilding it.
    pub fn to(&self, target: &Type) -> Option<Conversion> {
        let target = target.as_primitive()?;
        let same = |lit: &Literal| Some(Conversion::Literal(lit.clone()));
        match self {
            Literal::Boolean(_) => match target {
                PrimitiveType::Boolean => same(self),
                _ => None,
            },
            Literal::Int(v) => match target {
                PrimitiveType::Int => same(self),
                PrimitiveType::Long => Some(Conversion::Literal(Literal::Long(i64::from(*v)))),
                PrimitiveType::Float => Some(Conversion::Literal(Literal::Float(*v as f32))),
                PrimitiveType::Double => Some(Conversion::Literal(Literal::Double(f64::from(*v)))),
                PrimitiveType::Decimal(dt) => Some(integer_to_decimal(i128::from(*v), dt)),
                _ => None,
            },
            Literal::Long(v) => match target {
                PrimitiveType::Int => {
                    if *v > i64::from(i32::MAX) {
                        Some(Conversion::AboveMax)
                    } else if *v < i64::from(i32::MIN) {
                        Some(Conversion::BelowMin)
                    } else {
                        Some(Conversion::Literal(Literal::Int(*v as i32)))
                    }
                }
                PrimitiveType::Long => same(self),
                PrimitiveType::Float => Some(Conversion::Literal(Literal::Float(*v as f32))),
                PrimitiveType::Double => Some(Conversion::Literal(Literal::Double(*v as f64))),
                PrimitiveType::Decimal(dt) => Some(integer_to_decimal(i128::from(*v), dt)),
                _ => None,
            },
            Literal::Float(v) => match target {
                PrimitiveType::Float => same(self),
                PrimitiveType::Double => Some(Conversion::Literal(Literal::Double(f64::from(*v)))),
                PrimitiveType::Decimal(dt) => float_to_decimal(f64::from(*v), dt),
                _ => None,
            },
            Literal::Double(v) => match target {
                PrimitiveType::Float => {
                    if *v > f64::from(f32::MAX) {
                        Some(Conversion::AboveMax)
                    } else if *v < f64::from(f32::MIN) {
                        Some(Conversion::BelowMin)
                    } else {
                        Some(Conversion::Literal(Literal::Float(*v as f32)))
                    }
                }
                PrimitiveType::Double => same(self),
                PrimitiveType::Decimal(dt) => float_to_decimal(*v, dt),
                _ => None,
            },
            Literal::Date(_) => match target {
                PrimitiveType::Date => same(self),
                _ => None,
            },
            Literal::Time(_) => match target {
                PrimitiveType::Time => same(self),
                _ => None,
            },
            Literal::Timestamp(_) => match target {
                PrimitiveType::Timestamp => same(self),
                _ => None,
            },
            Literal::Timestamptz(_) => match target {
                PrimitiveType::Timestamptz => same(self),
                _ => None,
            },
            Literal::String(s) => match target {
                PrimitiveType::String => same(self),
                PrimitiveType::Date => string_to_date(s),
                PrimitiveType::Time => string_to_time(s),
                PrimitiveType::Timestamp => string_to_timestamp(s),
                PrimitiveType::Timestamptz => string_to_timestamptz(s),
                PrimitiveType::Uuid => Uuid::parse_str(s)
                    .ok()
                    .map(|uuid| Conversion::Literal(Literal::Uuid(uuid))),
                PrimitiveType::Decimal(dt) => string_to_decimal(s, dt),
                _ => None,
            },
            Literal::Uuid(_) => match target {
                PrimitiveType::Uuid => same(self),
                _ => None,
            },
            Literal::Fixed(bytes) => match target {
                PrimitiveType::Fixed(length) if *length == bytes.len() as u64 => same(self),
                PrimitiveType::Binary => Some(Conversion::Literal(Literal::Binary(bytes.clone()))),
                _ => None,
            },
            Literal::Binary(bytes) => match target {
                PrimitiveType::Binary => same(self),
                PrimitiveType::Fixed(length) if *length == bytes.len() as u64 => {
                    Some(Conversion::Literal(Literal::Fixed(bytes.clone())))
                }
                _ => None,
            },
            Literal::Decimal(value) => match target {
                PrimitiveType::Decimal(dt) => decimal_to_decimal(value, dt),
                _ => None,
            },
        }
    }
}

fn integer_to_decimal(value: i128, dt: &DecimalType) -> Conversion {
    let unscaled = 10i128
        .checked_pow(dt.scale())
        .and_then(|shift| value.checked_mul(shift));
    match unscaled {
        Some(unscaled) if DecimalValue::new(unscaled, dt.scale()).digits() <= dt.precision() => {
            Conversion::Literal(Literal::decimal(unscaled, dt.scale()))
        }
        _ => Conversion::out_of_range(value < 0),
    }
}

// Floats go through their shortest round-trip decimal rendering before
// rescaling, so 34.555f64 rounds to 34.56 at scale 2 rather than through the
// underlying binary approximation.
fn float_to_decimal(value: f64, dt: &DecimalType) -> Option<Conversion> {
    if value.is_nan() {
        return None;
    }
    if !value.is_finite() {
        return Some(Conversion::out_of_range(value < 0.0));
    }
    let rendered = format!("{}", value);
    match parse_decimal(&rendered)? {
        ParsedDecimal::Overflow { negative } => Some(Conversion::out_of_range(negative)),
        ParsedDecimal::Value(unscaled, scale) => {
            match rescale_half_up(unscaled, scale, dt.scale()) {
                None => Some(Conversion::out_of_range(unscaled < 0)),
                Some(rescaled) => {
                    if DecimalValue::new(rescaled, dt.scale()).digits() <= dt.precision() {
                        Some(Conversion::Literal(Literal::decimal(rescaled, dt.scale())))
                    } else {
                        Some(Conversion::out_of_range(rescaled < 0))
                    }
                }
            }
        }
    }
}

// Rescale an unscaled/scale pair to a new scale, rounding half away from
// zero. `None` means the widened value overflows i128.
fn rescale_half_up(unscaled: i128, scale: u32, target_scale: u32) -> Option<i128> {
    if scale == target_scale {
        return Some(unscaled);
    }
    if scale < target_scale {
        return 10i128
            .checked_pow(target_scale - scale)
            .and_then(|shift| unscaled.checked_mul(shift));
    }
    let shift = scale - target_scale;
    if shift > 38 {
        // even i128::MAX rounds to zero across a 39-digit shift
        return Some(0);
    }
    let divisor = 10i128.pow(shift);
    let quotient = unscaled / divisor;
    let remainder = (unscaled % divisor).unsigned_abs();
    if remainder * 2 >= divisor.unsigned_abs() {
        Some(quotient + if unscaled < 0 { -1 } else { 1 })
    } else {
        Some(quotient)
    }
}

fn decimal_to_decimal(value: &DecimalValue, dt: &DecimalType) -> Option<Conversion> {
    if value.scale() != dt.scale() || value.digits() > dt.precision() {
        return None;
    }
    Some(Conversion::Literal(Literal::Decimal(*value)))
}

fn string_to_decimal(s: &str, dt: &DecimalType) -> Option<Conversion> {
    match parse_decimal(s)? {
        ParsedDecimal::Overflow { .. } => None,
        ParsedDecimal::Value(unscaled, scale) => {
            let value = DecimalValue::new(unscaled, scale);
            if scale != dt.scale() || value.digits() > dt.precision() {
                return None;
            }
            Some(Conversion::Literal(Literal::Decimal(value)))
        }
    }
}

pub(crate) fn date_to_epoch_days(date: civil::Date) -> Option<i32> {
    let zoned = date.at(0, 0, 0, 0).to_zoned(TimeZone::UTC).ok()?;
    // civil UTC midnights land on exact day boundaries
    i32::try_from(zoned.timestamp().as_second() / 86_400).ok()
}

fn string_to_date(s: &str) -> Option<Conversion> {
    let date: civil::Date = s.parse().ok()?;
    Some(Conversion::Literal(Literal::Date(date_to_epoch_days(date)?)))
}

fn string_to_time(s: &str) -> Option<Conversion> {
    let time: civil::Time = s.parse().ok()?;
    let micros = (i64::from(time.hour()) * 3_600 + i64::from(time.minute()) * 60
        + i64::from(time.second()))
        * 1_000_000
        + i64::from(time.subsec_nanosecond()) / 1_000;
    Some(Conversion::Literal(Literal::Time(micros)))
}

fn string_to_timestamp(s: &str) -> Option<Conversion> {
    let datetime: civil::DateTime = s.parse().ok()?;
    let zoned = datetime.to_zoned(TimeZone::UTC).ok()?;
    Some(Conversion::Literal(Literal::Timestamp(
        zoned.timestamp().as_microsecond(),
    )))
}

fn string_to_timestamptz(s: &str) -> Option<Conversion> {
    let timestamp: jiff::Timestamp = s.parse().ok()?;
    Some(Conversion::Literal(Literal::Timestamptz(
        timestamp.as_microsecond(),
    )))
}

#[cfg(test)]
mod tests {
    use floe_schema::DecimalType;
    use rstest::rstest;

    use super::*;

    fn decimal_type(precision: u32, scale: u32) -> Type {
        Type::Primitive(PrimitiveType::Decimal(DecimalType::new(precision, scale)))
    }

    fn primitive(p: PrimitiveType) -> Type {
        Type::Primitive(p)
    }

    #[test]
    fn long_narrowing_uses_sentinels() {
        let long = Literal::from(9_999_999_999i64);
        assert_eq!(
            long.to(&primitive(PrimitiveType::Int)),
            Some(Conversion::AboveMax)
        );
        let negative = Literal::from(-9_999_999_999i64);
        assert_eq!(
            negative.to(&primitive(PrimitiveType::Int)),
            Some(Conversion::BelowMin)
        );
        assert_eq!(
            Literal::from(34i64).to(&primitive(PrimitiveType::Int)),
            Some(Conversion::Literal(Literal::Int(34)))
        );
    }

    #[test]
    fn double_narrowing_uses_sentinels() {
        assert_eq!(
            Literal::from(f64::MAX).to(&primitive(PrimitiveType::Float)),
            Some(Conversion::AboveMax)
        );
        assert_eq!(
            Literal::from(f64::MIN).to(&primitive(PrimitiveType::Float)),
            Some(Conversion::BelowMin)
        );
        assert_eq!(
            Literal::from(1.5f64).to(&primitive(PrimitiveType::Float)),
            Some(Conversion::Literal(Literal::Float(1.5)))
        );
    }

    #[test]
    fn integers_scale_into_decimals() {
        assert_eq!(
            Literal::from(34).to(&decimal_type(9, 2)),
            Some(Conversion::Literal(Literal::decimal(3400, 2)))
        );
        // six digits do not fit a four-digit precision
        assert_eq!(
            Literal::from(123_456).to(&decimal_type(4, 0)),
            Some(Conversion::AboveMax)
        );
        assert_eq!(
            Literal::from(-123_456).to(&decimal_type(4, 0)),
            Some(Conversion::BelowMin)
        );
    }

    #[test]
    fn floats_round_half_up() {
        assert_eq!(
            Literal::from(34.555f64).to(&decimal_type(9, 2)),
            Some(Conversion::Literal(Literal::decimal(3456, 2)))
        );
        assert_eq!(
            Literal::from(-34.555f64).to(&decimal_type(9, 2)),
            Some(Conversion::Literal(Literal::decimal(-3456, 2)))
        );
        assert_eq!(
            Literal::from(34.554f64).to(&decimal_type(9, 2)),
            Some(Conversion::Literal(Literal::decimal(3455, 2)))
        );
        assert_eq!(
            Literal::from(1.0e30f64).to(&decimal_type(9, 2)),
            Some(Conversion::AboveMax)
        );
        assert!(Literal::from(f64::NAN).to(&decimal_type(9, 2)).is_none());
    }

    #[test]
    fn strings_parse_into_decimals_when_the_scale_matches() {
        assert_eq!(
            Literal::from("34.55").to(&decimal_type(9, 2)),
            Some(Conversion::Literal(Literal::decimal(3455, 2)))
        );
        // spec roundtrip: the unscaled value equals the string-parse
        let converted = Literal::from("34.55")
            .to(&decimal_type(9, 2))
            .and_then(Conversion::literal)
            .unwrap();
        match converted {
            Literal::Decimal(value) => assert_eq!(value.unscaled(), 3455),
            other => panic!("expected a decimal, got {other}"),
        }
        assert!(Literal::from("34.55").to(&decimal_type(9, 1)).is_none());
        assert!(Literal::from("34.555").to(&decimal_type(9, 2)).is_none());
        assert!(Literal::from("not a number").to(&decimal_type(9, 2)).is_none());
    }

    #[test]
    fn decimal_precision_may_widen_but_scale_is_fixed() {
        let value = Literal::decimal(3455, 2);
        assert_eq!(
            value.to(&decimal_type(18, 2)),
            Some(Conversion::Literal(Literal::decimal(3455, 2)))
        );
        assert!(value.to(&decimal_type(9, 3)).is_none());
        assert!(value.to(&decimal_type(3, 2)).is_none());
    }

    #[test]
    fn strings_parse_into_temporals() {
        assert_eq!(
            Literal::from("2017-11-16").to(&primitive(PrimitiveType::Date)),
            Some(Conversion::Literal(Literal::Date(17_486)))
        );
        assert_eq!(
            Literal::from("22:31:08").to(&primitive(PrimitiveType::Time)),
            Some(Conversion::Literal(Literal::Time(81_068_000_000)))
        );
        assert_eq!(
            Literal::from("22:31:08.123").to(&primitive(PrimitiveType::Time)),
            Some(Conversion::Literal(Literal::Time(81_068_123_000)))
        );
        assert_eq!(
            Literal::from("2017-11-16T22:31:08").to(&primitive(PrimitiveType::Timestamp)),
            Some(Conversion::Literal(Literal::Timestamp(1_510_871_468_000_000)))
        );
        assert_eq!(
            Literal::from("2017-11-16T14:31:08-08:00").to(&primitive(PrimitiveType::Timestamptz)),
            Some(Conversion::Literal(Literal::Timestamptz(
                1_510_871_468_000_000
            )))
        );
        // a zoneless string is not a timestamptz
        assert!(
            Literal::from("2017-11-16T22:31:08")
                .to(&primitive(PrimitiveType::Timestamptz))
                .is_none()
        );
        assert!(
            Literal::from("not a date")
                .to(&primitive(PrimitiveType::Date))
                .is_none()
        );
    }

    #[test]
    fn pre_epoch_dates_are_negative() {
        assert_eq!(
            Literal::from("1969-12-31").to(&primitive(PrimitiveType::Date)),
            Some(Conversion::Literal(Literal::Date(-1)))
        );
    }

    #[test]
    fn strings_parse_into_uuids() {
        let parsed = Literal::from("f79c3e09-677c-4bbd-a479-3f349cb785e7")
            .to(&primitive(PrimitiveType::Uuid))
            .and_then(Conversion::literal)
            .unwrap();
        assert_eq!(
            parsed,
            Literal::Uuid(Uuid::parse_str("f79c3e09-677c-4bbd-a479-3f349cb785e7").unwrap())
        );
        assert!(
            Literal::from("not a uuid")
                .to(&primitive(PrimitiveType::Uuid))
                .is_none()
        );
    }

    #[test]
    fn fixed_and_binary_check_lengths() {
        let fixed = Literal::fixed(vec![1u8, 2, 3, 4]);
        assert!(fixed.to(&primitive(PrimitiveType::Fixed(4))).is_some());
        assert!(fixed.to(&primitive(PrimitiveType::Fixed(8))).is_none());
        assert!(fixed.to(&primitive(PrimitiveType::Binary)).is_some());

        let binary = Literal::binary(vec![1u8, 2, 3, 4]);
        assert!(binary.to(&primitive(PrimitiveType::Fixed(4))).is_some());
        assert!(binary.to(&primitive(PrimitiveType::Fixed(2))).is_none());
    }

    fn representative(kind: &PrimitiveType, target: &PrimitiveType) -> Literal {
        match kind {
            PrimitiveType::Boolean => Literal::from(true),
            PrimitiveType::Int => Literal::from(34),
            PrimitiveType::Long => Literal::from(34i64),
            PrimitiveType::Float => Literal::from(1.5f32),
            PrimitiveType::Double => Literal::from(1.5f64),
            PrimitiveType::Date => Literal::date(17_486),
            PrimitiveType::Time => Literal::time_micros(81_068_000_000),
            PrimitiveType::Timestamp => Literal::timestamp_micros(1_510_871_468_000_000),
            PrimitiveType::Timestamptz => Literal::timestamptz_micros(1_510_871_468_000_000),
            PrimitiveType::String => match target {
                PrimitiveType::Date => Literal::from("2017-11-16"),
                PrimitiveType::Time => Literal::from("22:31:08"),
                PrimitiveType::Timestamp => Literal::from("2017-11-16T22:31:08"),
                PrimitiveType::Timestamptz => Literal::from("2017-11-16T22:31:08Z"),
                PrimitiveType::Uuid => Literal::from("f79c3e09-677c-4bbd-a479-3f349cb785e7"),
                PrimitiveType::Decimal(_) => Literal::from("34.55"),
                _ => Literal::from("iceberg"),
            },
            PrimitiveType::Uuid => {
                Literal::Uuid(Uuid::parse_str("f79c3e09-677c-4bbd-a479-3f349cb785e7").unwrap())
            }
            PrimitiveType::Fixed(_) => Literal::fixed(vec![0u8; 16]),
            PrimitiveType::Binary => Literal::binary(vec![0u8; 16]),
            PrimitiveType::Decimal(_) => Literal::decimal(3455, 2),
        }
    }

    fn allowed(kind: &PrimitiveType, target: &PrimitiveType) -> bool {
        use PrimitiveType::*;
        match kind {
            Boolean => matches!(target, Boolean),
            Int | Long => matches!(target, Int | Long | Float | Double | Decimal(_)),
            Float | Double => matches!(target, Float | Double | Decimal(_)),
            Date => matches!(target, Date),
            Time => matches!(target, Time),
            Timestamp => matches!(target, Timestamp),
            Timestamptz => matches!(target, Timestamptz),
            String => matches!(
                target,
                String | Date | Time | Timestamp | Timestamptz | Uuid | Decimal(_)
            ),
            Uuid => matches!(target, Uuid),
            Fixed(_) => matches!(target, Fixed(16) | Binary),
            Binary => matches!(target, Binary | Fixed(16)),
            Decimal(_) => matches!(target, Decimal(_)),
        }
    }

    #[test]
    fn conversion_matrix_is_exact() {
        let kinds = [
            PrimitiveType::Boolean,
            PrimitiveType::Int,
            PrimitiveType::Long,
            PrimitiveType::Float,
            PrimitiveType::Double,
            PrimitiveType::Date,
            PrimitiveType::Time,
            PrimitiveType::Timestamp,
            PrimitiveType::Timestamptz,
            PrimitiveType::String,
            PrimitiveType::Uuid,
            PrimitiveType::Fixed(16),
            PrimitiveType::Binary,
            PrimitiveType::Decimal(DecimalType::new(9, 2)),
        ];
        for kind in &kinds {
            for target in &kinds {
                let literal = representative(kind, target);
                let result = literal.to(&Type::Primitive(*target));
                assert_eq!(
                    result.is_some(),
                    allowed(kind, target),
                    "{:?} -> {}",
                    kind,
                    target
                );
            }
        }
    }

    #[rstest]
    #[case(Literal::from(true), PrimitiveType::Boolean)]
    #[case(Literal::from(34), PrimitiveType::Int)]
    #[case(Literal::from(34i64), PrimitiveType::Long)]
    #[case(Literal::from(1.5f32), PrimitiveType::Float)]
    #[case(Literal::from(1.5f64), PrimitiveType::Double)]
    #[case(Literal::from("iceberg"), PrimitiveType::String)]
    #[case(Literal::date(17_486), PrimitiveType::Date)]
    #[case(Literal::fixed(vec![7u8; 3]), PrimitiveType::Fixed(3))]
    #[case(Literal::binary(vec![7u8; 3]), PrimitiveType::Binary)]
    #[case(Literal::decimal(3455, 2), PrimitiveType::Decimal(DecimalType::new(9, 2)))]
    fn converting_to_the_same_type_is_identity(
        #[case] literal: Literal,
        #[case] target: PrimitiveType,
    ) {
        let target = Type::Primitive(target);
        let converted = literal.to(&target).and_then(Conversion::literal).unwrap();
        assert_eq!(converted, literal);
        // and converting the result again changes nothing
        let again = converted.to(&target).and_then(Conversion::literal).unwrap();
        assert_eq!(again, converted);
    }
}
