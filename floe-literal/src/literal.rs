use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bytes::Bytes;
use floe_error::{FloeResult, floe_bail};
use floe_schema::{DecimalType, PrimitiveType};
use uuid::Uuid;

/// A fixed-point decimal value: an unscaled integer and a scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalValue {
    unscaled: i128,
    scale: u32,
}

impl DecimalValue {
    /// Create a decimal value from its unscaled integer and scale.
    pub fn new(unscaled: i128, scale: u32) -> Self {
        Self { unscaled, scale }
    }

    /// The unscaled integer.
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// The number of digits after the decimal point.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// The number of significant digits, at least 1 (`0.001` has one digit).
    pub fn digits(&self) -> u32 {
        let mut value = self.unscaled.unsigned_abs();
        let mut digits = 1;
        while value >= 10 {
            value /= 10;
            digits += 1;
        }
        digits
    }

    /// Compare by numeric value regardless of scale.
    pub fn compare(&self, other: &DecimalValue) -> Ordering {
        if self.scale == other.scale {
            return self.unscaled.cmp(&other.unscaled);
        }
        if self.scale < other.scale {
            let shift = 10i128.checked_pow(other.scale - self.scale);
            match shift.and_then(|s| self.unscaled.checked_mul(s)) {
                Some(scaled) => scaled.cmp(&other.unscaled),
                // the rescaled magnitude exceeds i128, so it dominates
                None => {
                    if self.unscaled >= 0 {
                        Ordering::Greater
                    } else {
                        Ordering::Less
                    }
                }
            }
        } else {
            other.compare(self).reverse()
        }
    }
}

impl Display for DecimalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        let magnitude = self.unscaled.unsigned_abs();
        let divisor = 10u128.pow(self.scale);
        let sign = if self.unscaled < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            magnitude / divisor,
            magnitude % divisor,
            width = self.scale as usize
        )
    }
}

/// A value tagged by its runtime type.
///
/// Literals are immutable; conversions to other types go through
/// [`Literal::to`](crate::Conversion) and never mutate the source.
#[derive(Debug, Clone)]
pub enum Literal {
    /// A boolean value.
    Boolean(bool),
    /// A 32-bit integer value.
    Int(i32),
    /// A 64-bit integer value.
    Long(i64),
    /// A 32-bit floating point value.
    Float(f32),
    /// A 64-bit floating point value.
    Double(f64),
    /// Days from 1970-01-01.
    Date(i32),
    /// Microseconds from midnight.
    Time(i64),
    /// Microseconds from 1970-01-01T00:00:00, without a zone.
    Timestamp(i64),
    /// Microseconds from 1970-01-01T00:00:00+00:00.
    Timestamptz(i64),
    /// A character sequence.
    String(Arc<str>),
    /// A UUID value.
    Uuid(Uuid),
    /// A fixed-length byte buffer.
    Fixed(Bytes),
    /// A variable-length byte buffer.
    Binary(Bytes),
    /// A fixed-point decimal value.
    Decimal(DecimalValue),
}

impl Literal {
    /// A fixed-length binary literal carrying its buffer.
    pub fn fixed(bytes: impl Into<Bytes>) -> Self {
        Literal::Fixed(bytes.into())
    }

    /// A variable-length binary literal.
    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Literal::Binary(bytes.into())
    }

    /// A decimal literal from its unscaled value and scale.
    pub fn decimal(unscaled: i128, scale: u32) -> Self {
        Literal::Decimal(DecimalValue::new(unscaled, scale))
    }

    /// A decimal literal parsed from its plain string form, e.g. `"34.55"`.
    pub fn decimal_from_str(s: &str) -> FloeResult<Self> {
        match parse_decimal(s) {
            Some(ParsedDecimal::Value(unscaled, scale)) => Ok(Literal::decimal(unscaled, scale)),
            Some(ParsedDecimal::Overflow { .. }) => {
                floe_bail!("decimal value does not fit in 38 digits: {}", s)
            }
            None => floe_bail!("invalid decimal value: {}", s),
        }
    }

    /// A date literal from days since 1970-01-01.
    pub fn date(days: i32) -> Self {
        Literal::Date(days)
    }

    /// A time literal from microseconds since midnight.
    pub fn time_micros(micros: i64) -> Self {
        Literal::Time(micros)
    }

    /// A timestamp literal from microseconds since the epoch.
    pub fn timestamp_micros(micros: i64) -> Self {
        Literal::Timestamp(micros)
    }

    /// A UTC-adjusted timestamp literal from microseconds since the epoch.
    pub fn timestamptz_micros(micros: i64) -> Self {
        Literal::Timestamptz(micros)
    }

    /// The natural primitive type of this literal. Fixed literals report
    /// their buffer length; decimals report their minimal precision.
    pub fn literal_type(&self) -> PrimitiveType {
        match self {
            Literal::Boolean(_) => PrimitiveType::Boolean,
            Literal::Int(_) => PrimitiveType::Int,
            Literal::Long(_) => PrimitiveType::Long,
            Literal::Float(_) => PrimitiveType::Float,
            Literal::Double(_) => PrimitiveType::Double,
            Literal::Date(_) => PrimitiveType::Date,
            Literal::Time(_) => PrimitiveType::Time,
            Literal::Timestamp(_) => PrimitiveType::Timestamp,
            Literal::Timestamptz(_) => PrimitiveType::Timestamptz,
            Literal::String(_) => PrimitiveType::String,
            Literal::Uuid(_) => PrimitiveType::Uuid,
            Literal::Fixed(bytes) => PrimitiveType::Fixed(bytes.len() as u64),
            Literal::Binary(_) => PrimitiveType::Binary,
            Literal::Decimal(value) => {
                PrimitiveType::Decimal(DecimalType::new(value.digits(), value.scale()))
            }
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Boolean(a), Literal::Boolean(b)) => a == b,
            (Literal::Int(a), Literal::Int(b)) => a == b,
            (Literal::Long(a), Literal::Long(b)) => a == b,
            // bitwise, so literals remain usable as keys
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            (Literal::Double(a), Literal::Double(b)) => a.to_bits() == b.to_bits(),
            (Literal::Date(a), Literal::Date(b)) => a == b,
            (Literal::Time(a), Literal::Time(b)) => a == b,
            (Literal::Timestamp(a), Literal::Timestamp(b)) => a == b,
            (Literal::Timestamptz(a), Literal::Timestamptz(b)) => a == b,
            (Literal::String(a), Literal::String(b)) => a == b,
            (Literal::Uuid(a), Literal::Uuid(b)) => a == b,
            (Literal::Fixed(a), Literal::Fixed(b)) => a == b,
            (Literal::Binary(a), Literal::Binary(b)) => a == b,
            (Literal::Decimal(a), Literal::Decimal(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Literal::Boolean(v) => v.hash(state),
            Literal::Int(v) => v.hash(state),
            Literal::Long(v) => v.hash(state),
            Literal::Float(v) => v.to_bits().hash(state),
            Literal::Double(v) => v.to_bits().hash(state),
            Literal::Date(v) => v.hash(state),
            Literal::Time(v) => v.hash(state),
            Literal::Timestamp(v) => v.hash(state),
            Literal::Timestamptz(v) => v.hash(state),
            Literal::String(v) => v.hash(state),
            Literal::Uuid(v) => v.hash(state),
            Literal::Fixed(v) => v.hash(state),
            Literal::Binary(v) => v.hash(state),
            Literal::Decimal(v) => v.hash(state),
        }
    }
}

impl PartialOrd for Literal {
    /// A total order within each non-boolean literal kind, following the
    /// natural ordering of the value (floats use `total_cmp`, decimals
    /// compare numerically across scales). Booleans and mixed kinds do not
    /// compare.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Literal::Int(a), Literal::Int(b)) => Some(a.cmp(b)),
            (Literal::Long(a), Literal::Long(b)) => Some(a.cmp(b)),
            (Literal::Float(a), Literal::Float(b)) => Some(a.total_cmp(b)),
            (Literal::Double(a), Literal::Double(b)) => Some(a.total_cmp(b)),
            (Literal::Date(a), Literal::Date(b)) => Some(a.cmp(b)),
            (Literal::Time(a), Literal::Time(b)) => Some(a.cmp(b)),
            (Literal::Timestamp(a), Literal::Timestamp(b)) => Some(a.cmp(b)),
            (Literal::Timestamptz(a), Literal::Timestamptz(b)) => Some(a.cmp(b)),
            (Literal::String(a), Literal::String(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Literal::Uuid(a), Literal::Uuid(b)) => Some(a.cmp(b)),
            (Literal::Fixed(a), Literal::Fixed(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Literal::Binary(a), Literal::Binary(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Literal::Decimal(a), Literal::Decimal(b)) => Some(a.compare(b)),
            _ => None,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Boolean(v) => write!(f, "{}", v),
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Long(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Double(v) => write!(f, "{}", v),
            Literal::Date(v) => write!(f, "{}", v),
            Literal::Time(v) => write!(f, "{}", v),
            Literal::Timestamp(v) => write!(f, "{}", v),
            Literal::Timestamptz(v) => write!(f, "{}", v),
            Literal::String(v) => write!(f, "\"{}\"", v),
            Literal::Uuid(v) => write!(f, "{}", v),
            Literal::Fixed(v) | Literal::Binary(v) => {
                write!(f, "0x")?;
                for byte in v.iter() {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Literal::Decimal(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Long(value)
    }
}

impl From<f32> for Literal {
    fn from(value: f32) -> Self {
        Literal::Float(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Double(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(Arc::from(value))
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(Arc::from(value.as_str()))
    }
}

impl From<Uuid> for Literal {
    fn from(value: Uuid) -> Self {
        Literal::Uuid(value)
    }
}

impl From<&[u8]> for Literal {
    fn from(value: &[u8]) -> Self {
        Literal::Fixed(Bytes::copy_from_slice(value))
    }
}

impl From<Bytes> for Literal {
    fn from(value: Bytes) -> Self {
        Literal::Binary(value)
    }
}

pub(crate) enum ParsedDecimal {
    Value(i128, u32),
    Overflow { negative: bool },
}

/// Parse a plain decimal string (`-12.34`) into unscaled/scale form. No
/// exponent notation. Returns `None` on malformed input.
pub(crate) fn parse_decimal(s: &str) -> Option<ParsedDecimal> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let mut unscaled: i128 = 0;
    for digit in int_part.bytes().chain(frac_part.bytes()) {
        let step = unscaled
            .checked_mul(10)
            .and_then(|v| v.checked_add(i128::from(digit - b'0')));
        match step {
            Some(value) => unscaled = value,
            None => return Some(ParsedDecimal::Overflow { negative }),
        }
    }
    if negative {
        unscaled = -unscaled;
    }
    Some(ParsedDecimal::Value(unscaled, frac_part.len() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_display() {
        assert_eq!(Literal::decimal(3455, 2).to_string(), "34.55");
        assert_eq!(Literal::decimal(-3455, 2).to_string(), "-34.55");
        assert_eq!(Literal::decimal(5, 2).to_string(), "0.05");
        assert_eq!(Literal::decimal(1420, 0).to_string(), "1420");
    }

    #[test]
    fn decimal_parse() {
        assert_eq!(
            Literal::decimal_from_str("34.55").unwrap(),
            Literal::decimal(3455, 2)
        );
        assert_eq!(
            Literal::decimal_from_str("-0.001").unwrap(),
            Literal::decimal(-1, 3)
        );
        assert_eq!(
            Literal::decimal_from_str("1420").unwrap(),
            Literal::decimal(1420, 0)
        );
        assert!(Literal::decimal_from_str("14.2.0").is_err());
        assert!(Literal::decimal_from_str("1e2").is_err());
        assert!(Literal::decimal_from_str("").is_err());
    }

    #[test]
    fn literal_types() {
        assert_eq!(Literal::from(34).literal_type(), PrimitiveType::Int);
        assert_eq!(
            Literal::from("iceberg").literal_type(),
            PrimitiveType::String
        );
        assert_eq!(
            Literal::fixed(vec![0u8; 8]).literal_type(),
            PrimitiveType::Fixed(8)
        );
        assert_eq!(
            Literal::decimal(1420, 2).literal_type(),
            PrimitiveType::Decimal(DecimalType::new(4, 2))
        );
        assert_eq!(
            Literal::decimal(1, 3).literal_type(),
            PrimitiveType::Decimal(DecimalType::new(1, 3))
        );
    }

    #[test]
    fn ordering_follows_natural_order() {
        assert!(Literal::from(1) < Literal::from(2));
        assert!(Literal::from(-1.0f64) < Literal::from(1.0f64));
        assert!(Literal::from("a") < Literal::from("b"));
        // decimals compare across scales by numeric value
        assert_eq!(
            Literal::decimal(1420, 2).partial_cmp(&Literal::decimal(142, 1)),
            Some(Ordering::Equal)
        );
        assert!(Literal::decimal(1421, 2) > Literal::decimal(142, 1));
        // booleans and mixed kinds do not compare
        assert_eq!(
            Literal::from(true).partial_cmp(&Literal::from(false)),
            None
        );
        assert_eq!(Literal::from(1).partial_cmp(&Literal::from(1i64)), None);
    }

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Literal::from(f32::NAN), Literal::from(f32::NAN));
        assert_ne!(Literal::from(0.0f64), Literal::from(-0.0f64));
    }
}
