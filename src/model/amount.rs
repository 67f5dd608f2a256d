//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It parses values that may
//! include a dollar sign and commas, displays as `$1,234.56`, and is stored in JSON as a plain
//! number so that the dataset file stays readable by other tools.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Number of decimal places kept after every mutation.
const CENTS: u32 = 2;

/// Represents a dollar amount.
///
/// # Examples
///
/// Parsing with or without a dollar sign:
/// ```
/// # use fintrack::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("$1,200.00").unwrap();
/// let b = Amount::from_str("1200").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "$1,200.00");
/// ```
///
/// Truncation drops fractions of a cent instead of rounding them:
/// ```
/// # use fintrack::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("12.999").unwrap();
/// assert_eq!(a.truncate(), Amount::from_str("12.99").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value().is_sign_negative() && !self.is_zero()
    }

    /// Cuts the value to whole cents, toward zero. `12.999` becomes `12.99`, never `13.00`.
    pub fn truncate(&self) -> Self {
        Self::new(
            self.value
                .round_dp_with_strategy(CENTS, RoundingStrategy::ToZero),
        )
    }

    /// Divides the amount evenly over `count` parts. Dividing by zero parts yields zero.
    pub fn average_over(&self, count: usize) -> Self {
        if count == 0 {
            return Self::ZERO;
        }
        Self::new(self.value / Decimal::from(count))
    }

    /// The share of `total` that this amount represents, as a percentage.
    pub fn percent_of(&self, total: Amount) -> Decimal {
        if total.is_zero() {
            return Decimal::ZERO;
        }
        self.value * Decimal::ONE_HUNDRED / total.value
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // "-$50.00", "$50.00" or "50.00"
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else {
            trimmed.strip_prefix('$').unwrap_or(trimmed).to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount { value })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.value().abs().to_f64().unwrap_or_default();
        write!(f, "{sign}${}", format_num::format_num!(",.2", num))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.value.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Going through the shortest decimal rendering of the float keeps `12.34` as exactly
        // `12.34` instead of the nearest binary fraction.
        let f = f64::deserialize(deserializer)?;
        if !f.is_finite() {
            return Err(serde::de::Error::custom(format!("Invalid amount {f}")));
        }
        Amount::from_str(&f.to_string()).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new(self.value + rhs.value)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        assert_eq!(amt("$50.00").value(), Decimal::from_str("50.00").unwrap());
        assert_eq!(amt("-$50.00").value(), Decimal::from_str("-50.00").unwrap());
    }

    #[test]
    fn test_parse_with_commas() {
        assert_eq!(
            amt("$1,234,567.89").value(),
            Decimal::from_str("1234567.89").unwrap()
        );
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(amt("  ").is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("abc").is_err());
    }

    #[test]
    fn test_truncate_is_toward_zero() {
        assert_eq!(amt("12.3456").truncate(), amt("12.34"));
        assert_eq!(amt("12.999").truncate(), amt("12.99"));
        assert_eq!(amt("-12.999").truncate(), amt("-12.99"));
        assert_eq!(amt("5.75").truncate(), amt("5.75"));
    }

    #[test]
    fn test_average_over_zero_is_zero() {
        assert_eq!(amt("100.00").average_over(0), Amount::ZERO);
        assert_eq!(amt("100.00").average_over(3).truncate(), amt("33.33"));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(amt("25").percent_of(amt("100")), Decimal::from(25));
        assert_eq!(amt("25").percent_of(Amount::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(amt("50").to_string(), "$50.00");
        assert_eq!(amt("-1234.5").to_string(), "-$1,234.50");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&amt("5.75")).unwrap(), "5.75");
        assert_eq!(serde_json::to_string(&amt("1200.00")).unwrap(), "1200.0");
    }

    #[test]
    fn test_deserialize_is_exact() {
        let a: Amount = serde_json::from_str("12.34").unwrap();
        assert_eq!(a.value(), Decimal::from_str("12.34").unwrap());
        let b: Amount = serde_json::from_str("0").unwrap();
        assert!(b.is_zero());
    }

    #[test]
    fn test_sum() {
        let total: Amount = [amt("1.10"), amt("2.20"), amt("3.30")].iter().sum();
        assert_eq!(total, amt("6.60"));
    }
}
