use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use floe_error::{FloeError, floe_bail, floe_panic};

use crate::Type;

/// The highest decimal precision representable by a 16-byte unscaled value.
pub const MAX_DECIMAL_PRECISION: u32 = 38;

// Derived once per process: the largest base-10 precision that fits in an
// n-byte two's-complement value, for n in [0, 23].
static MAX_PRECISION: LazyLock<[u32; 24]> = LazyLock::new(|| {
    let mut table = [0u32; 24];
    for (length, slot) in table.iter_mut().enumerate().skip(1) {
        let max_value = 2f64.powi(8 * length as i32 - 1) - 1.0;
        *slot = max_value.log10().floor() as u32;
    }
    table
});

// The smallest byte length whose max precision admits a given precision, for
// precision in [0, 39].
static REQUIRED_LENGTH: LazyLock<[u32; 40]> = LazyLock::new(|| {
    let mut table = [0u32; 40];
    for (precision, slot) in table.iter_mut().enumerate() {
        let length = (0..MAX_PRECISION.len())
            .find(|&length| precision as u32 <= MAX_PRECISION[length])
            .unwrap_or_else(|| {
                floe_panic!(
                    "decimal precision {} cannot be satisfied by any supported length",
                    precision
                )
            });
        *slot = length as u32;
    }
    table
});

/// The largest base-10 precision that fits in an unscaled two's-complement
/// value of `length` bytes.
pub fn decimal_max_precision(length: usize) -> u32 {
    if length >= MAX_PRECISION.len() {
        floe_panic!(InvalidArgument: "unsupported decimal length: {}", length);
    }
    MAX_PRECISION[length]
}

/// The number of unscaled-value bytes required to hold `precision` digits.
pub fn decimal_required_bytes(precision: u32) -> u32 {
    if precision as usize >= REQUIRED_LENGTH.len() {
        floe_panic!(InvalidArgument: "unsupported decimal precision: {}", precision);
    }
    REQUIRED_LENGTH[precision as usize]
}

/// Parameters that define the precision and scale of a decimal type.
///
/// Decimal types allow real numbers with the same precision and scale to be
/// represented exactly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DecimalType {
    precision: u32,
    scale: u32,
}

impl DecimalType {
    /// Checked constructor for a `DecimalType`.
    ///
    /// # Panics
    ///
    /// Attempting to build a new instance with invalid precision will panic.
    pub fn new(precision: u32, scale: u32) -> Self {
        assert!(
            (1..=MAX_DECIMAL_PRECISION).contains(&precision),
            "decimal precision {} is outside [1, {}]",
            precision,
            MAX_DECIMAL_PRECISION
        );

        Self { precision, scale }
    }

    /// Fallible constructor, for inputs that originate outside the process
    /// (e.g. parsed type strings).
    pub fn try_new(precision: u32, scale: u32) -> Result<Self, FloeError> {
        if !(1..=MAX_DECIMAL_PRECISION).contains(&precision) {
            floe_bail!(
                "decimal precision {} is outside [1, {}]",
                precision,
                MAX_DECIMAL_PRECISION
            );
        }
        Ok(Self { precision, scale })
    }

    /// The number of significant figures that the decimal tracks.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// The number of digits to the right of the decimal point.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// The number of unscaled-value bytes required for this precision.
    pub fn required_bytes(&self) -> u32 {
        decimal_required_bytes(self.precision)
    }
}

impl Display for DecimalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "decimal({},{})", self.precision, self.scale)
    }
}

impl TryFrom<&Type> for DecimalType {
    type Error = FloeError;

    fn try_from(value: &Type) -> Result<Self, Self::Error> {
        match value {
            Type::Primitive(crate::PrimitiveType::Decimal(dt)) => Ok(*dt),
            _ => floe_bail!("cannot convert type {} into a decimal type", value),
        }
    }
}
