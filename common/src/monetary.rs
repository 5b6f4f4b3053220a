//! Fixed-point monetary types.
//!
//! Amounts and exchange rates are unsigned integers scaled by 10^6,
//! matching the six-decimal token precision of the test currencies. All
//! arithmetic rounds by truncation toward zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits carried by [`Amount`] and [`Rate`].
pub const SCALE: u32 = 6;

/// Scaling factor for fixed-point(6) values.
pub const SCALE_FACTOR: u64 = 1_000_000;

/// Basis points in one whole (100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// A non-negative fixed-point(6) token amount.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero tokens.
    pub const ZERO: Amount = Amount(0);

    /// One whole token unit.
    pub const ONE: Amount = Amount(SCALE_FACTOR);

    /// Create from a raw fixed-point(6) integer.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Create from whole token units. Returns `None` on overflow.
    pub fn from_units(units: u64) -> Option<Self> {
        units.checked_mul(SCALE_FACTOR).map(Self)
    }

    /// Get the raw fixed-point(6) integer.
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Check if the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / SCALE_FACTOR, self.0 % SCALE_FACTOR)
    }
}

/// Error parsing a fixed-point value from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFixedError {
    /// Not a non-negative decimal number.
    #[error("Malformed fixed-point value")]
    Malformed,
    /// More than six fractional digits.
    #[error("More than {SCALE} decimal places")]
    TooManyDecimals,
    /// Value does not fit in the fixed-point range.
    #[error("Value out of range")]
    Overflow,
}

fn parse_fixed(s: &str) -> Result<u64, ParseFixedError> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ParseFixedError::Malformed);
    }
    // u64::from_str would accept a leading sign; only plain digits are valid
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ParseFixedError::Malformed);
    }
    if frac_part.len() > SCALE as usize {
        return Err(ParseFixedError::TooManyDecimals);
    }
    let int: u64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| ParseFixedError::Malformed)?
    };
    let frac: u64 = if frac_part.is_empty() {
        0
    } else {
        let digits: u64 = frac_part.parse().map_err(|_| ParseFixedError::Malformed)?;
        digits * 10u64.pow(SCALE - frac_part.len() as u32)
    };
    int.checked_mul(SCALE_FACTOR)
        .and_then(|v| v.checked_add(frac))
        .ok_or(ParseFixedError::Overflow)
}

impl FromStr for Amount {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s).map(Amount)
    }
}

/// A fixed-point(6) exchange rate: target units per source unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rate(u64);

impl Rate {
    /// The 1:1 rate.
    pub const ONE: Rate = Rate(SCALE_FACTOR);

    /// Create from a raw fixed-point(6) integer.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw fixed-point(6) integer.
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Check if the rate is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Apply the rate to an amount: `floor(amount * rate / 10^6)`.
    ///
    /// Returns `None` if the result does not fit in an [`Amount`].
    pub fn apply(&self, amount: Amount) -> Option<Amount> {
        let product = amount.raw() as u128 * self.0 as u128;
        u64::try_from(product / SCALE_FACTOR as u128)
            .ok()
            .map(Amount::from_raw)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / SCALE_FACTOR, self.0 % SCALE_FACTOR)
    }
}

impl FromStr for Rate {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s).map(Rate)
    }
}

/// A proportional fee rate expressed in basis points (1/100 of a percent).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero fee.
    pub const ZERO: BasisPoints = BasisPoints(0);

    /// Create from a raw basis-point count.
    pub const fn new(bps: u32) -> Self {
        Self(bps)
    }

    /// Get the raw basis-point count.
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Check if the fee rate is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Take this fraction of an amount: `floor(amount * bps / 10_000)`.
    ///
    /// Returns `None` if the result does not fit in an [`Amount`].
    pub fn apply(&self, amount: Amount) -> Option<Amount> {
        let product = amount.raw() as u128 * self.0 as u128;
        u64::try_from(product / BPS_DENOMINATOR as u128)
            .ok()
            .map(Amount::from_raw)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

/// Currency code for one of the bridged tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Test USD token.
    pub fn tusd() -> Self {
        Self::new("TUSD")
    }

    /// Test EUR token.
    pub fn teur() -> Self {
        Self::new("TEUR")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_units_and_raw() {
        let one = Amount::from_units(1).unwrap();
        assert_eq!(one, Amount::ONE);
        assert_eq!(one.raw(), 1_000_000);
        assert!(Amount::from_units(u64::MAX).is_none());
    }

    #[test]
    fn test_amount_checked_arithmetic() {
        let a = Amount::from_raw(900_000);
        let b = Amount::from_raw(4_500);
        assert_eq!(a.checked_add(b), Some(Amount::from_raw(904_500)));
        assert_eq!(a.checked_sub(b), Some(Amount::from_raw(895_500)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(Amount::from_raw(u64::MAX).checked_add(Amount::ONE), None);
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_raw(1_500_000).to_string(), "1.500000");
        assert_eq!(Amount::from_raw(42).to_string(), "0.000042");
        assert_eq!(Amount::ZERO.to_string(), "0.000000");
    }

    #[test]
    fn test_amount_parse() {
        assert_eq!("1.5".parse::<Amount>().unwrap(), Amount::from_raw(1_500_000));
        assert_eq!("100".parse::<Amount>().unwrap(), Amount::from_units(100).unwrap());
        assert_eq!(".25".parse::<Amount>().unwrap(), Amount::from_raw(250_000));
        assert_eq!(
            "0.1234567".parse::<Amount>(),
            Err(ParseFixedError::TooManyDecimals)
        );
        assert_eq!("-1".parse::<Amount>(), Err(ParseFixedError::Malformed));
        assert_eq!("".parse::<Amount>(), Err(ParseFixedError::Malformed));
    }

    #[test]
    fn test_parse_rejects_signs_inside_parts() {
        assert_eq!("+1".parse::<Amount>(), Err(ParseFixedError::Malformed));
        assert_eq!("1.+5".parse::<Amount>(), Err(ParseFixedError::Malformed));
        assert_eq!("+1.5".parse::<Amount>(), Err(ParseFixedError::Malformed));
        assert_eq!("1.-5".parse::<Rate>(), Err(ParseFixedError::Malformed));
        assert_eq!("1e3".parse::<Amount>(), Err(ParseFixedError::Malformed));
    }

    #[test]
    fn test_rate_apply_floors() {
        // 0.9 applied to 1.0 is exactly 0.9
        let rate = Rate::from_raw(900_000);
        assert_eq!(rate.apply(Amount::ONE), Some(Amount::from_raw(900_000)));
        // 0.9 applied to one raw unit truncates to zero
        assert_eq!(rate.apply(Amount::from_raw(1)), Some(Amount::ZERO));
        // Truncation, never rounding up
        assert_eq!(
            Rate::from_raw(333_333).apply(Amount::from_raw(3)),
            Some(Amount::ZERO)
        );
    }

    #[test]
    fn test_rate_apply_overflow() {
        let rate = Rate::from_raw(2_000_000);
        assert_eq!(rate.apply(Amount::from_raw(u64::MAX)), None);
    }

    #[test]
    fn test_basis_points_apply() {
        let bps = BasisPoints::new(50);
        assert_eq!(
            bps.apply(Amount::from_raw(900_000)),
            Some(Amount::from_raw(4_500))
        );
        assert_eq!(bps.apply(Amount::from_raw(199)), Some(Amount::ZERO));
        assert_eq!(
            BasisPoints::ZERO.apply(Amount::from_units(1_000).unwrap()),
            Some(Amount::ZERO)
        );
    }

    #[test]
    fn test_currency_normalization() {
        assert_eq!(Currency::new("tusd"), Currency::tusd());
        assert_eq!(Currency::teur().code(), "TEUR");
    }

    #[test]
    fn test_amount_serde_transparent() {
        let amount = Amount::from_raw(895_500);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "895500");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
