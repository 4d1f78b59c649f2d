//! Amount type for handling monetary values typed in by hand.
//!
//! Values in the nursery sheets are typed by people used to Brazilian formatting, so an amount may
//! arrive as `5.00`, `5,00`, `R$ 1.234,56` or `$1,234.56`. This module provides the `Amount` type
//! which wraps `Decimal` and handles all of these.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use tracing::warn;

/// Represents a monetary amount.
///
/// Equality is numeric, so `5.0` and `5.00` are equal, but the scale that was parsed is kept and
/// written back out unchanged by `Display`.
///
/// # Examples
///
/// ```
/// # use nursery_ledger::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("R$ 1.234,56").unwrap();
/// let b = Amount::from_str("1234.56").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b.to_string(), "1234.56");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// This amount multiplied by `quantity`, e.g. a unit price times the units sold.
    pub fn times(&self, quantity: u32) -> Amount {
        Amount(or_zero(self.0.checked_mul(Decimal::from(quantity)), "A multiplication"))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Formats the amount for people, e.g. `R$ 1,234.56` or `-R$ 60.00`.
    pub fn to_currency(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.abs().round_dp(2);
        format!(
            "{sign}R$ {}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

/// An error that can occur when parsing strings into `Amount` values.
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

/// Removes currency symbols and whitespace and resolves which of `.` and `,` is the decimal
/// separator. When both appear, the rightmost one is the decimal separator. When only one kind
/// appears, a single occurrence is the decimal separator and repeated occurrences are thousands
/// separators.
fn normalize(s: &str) -> String {
    let stripped: String = s
        .trim()
        .replace("R$", "")
        .replace('$', "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let dots = stripped.matches('.').count();
    let commas = stripped.matches(',').count();

    match (dots, commas) {
        (0, 0) => stripped,
        (_, 0) if dots > 1 => stripped.replace('.', ""),
        (_, 0) => stripped,
        (0, 1) => stripped.replace(',', "."),
        (0, _) => stripped.replace(',', ""),
        _ => {
            let last_dot = stripped.rfind('.').unwrap_or_default();
            let last_comma = stripped.rfind(',').unwrap_or_default();
            if last_comma > last_dot {
                stripped.replace('.', "").replace(',', ".")
            } else {
                stripped.replace(',', "")
            }
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        if normalized.is_empty() {
            return Ok(Amount::ZERO);
        }
        let value = Decimal::from_str(&normalized).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(or_zero(self.0.checked_add(rhs.0), "An addition"))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(or_zero(self.0.checked_sub(rhs.0), "A subtraction"))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

/// Unwraps a checked `Decimal` operation. A result too large for a `Decimal` is logged and becomes
/// zero, the same as any other cell that cannot be read.
pub(crate) fn or_zero(result: Option<Decimal>, operation: &str) -> Decimal {
    result.unwrap_or_else(|| {
        warn!("{operation} overflowed the largest supported amount, using 0");
        Decimal::ZERO
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec!(50.00));
    }

    #[test]
    fn test_parse_comma_decimal() {
        let amount = Amount::from_str("5,25").unwrap();
        assert_eq!(amount.value(), dec!(5.25));
    }

    #[test]
    fn test_parse_brazilian_thousands() {
        let amount = Amount::from_str("R$ 1.234,56").unwrap();
        assert_eq!(amount.value(), dec!(1234.56));
    }

    #[test]
    fn test_parse_us_thousands() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec!(1234567.89));
    }

    #[test]
    fn test_parse_repeated_dots_are_thousands() {
        let amount = Amount::from_str("1.000.000").unwrap();
        assert_eq!(amount.value(), dec!(1000000));
    }

    #[test]
    fn test_parse_negative() {
        let amount = Amount::from_str("-R$ 60,00").unwrap();
        assert_eq!(amount.value(), dec!(-60));
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert_eq!(Amount::from_str("   ").unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(Amount::from_str("abc").is_err());
    }

    #[test]
    fn test_display_keeps_scale() {
        let amount = Amount::from_str("5.125").unwrap();
        assert_eq!(amount.to_string(), "5.125");
        let amount = Amount::from_str("5.00").unwrap();
        assert_eq!(amount.to_string(), "5.00");
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(Amount::from_str("5.0").unwrap(), Amount::from_str("5").unwrap());
    }

    #[test]
    fn test_to_currency() {
        assert_eq!(Amount::new(dec!(1234.5)).to_currency(), "R$ 1,234.50");
        assert_eq!(Amount::new(dec!(-60)).to_currency(), "-R$ 60.00");
        assert_eq!(Amount::ZERO.to_currency(), "R$ 0.00");
    }

    #[test]
    fn test_sum() {
        let total: Amount = ["1.50", "2,50", "R$ 6"]
            .iter()
            .map(|s| Amount::from_str(s).unwrap())
            .sum();
        assert_eq!(total.value(), dec!(10));
    }

    #[test]
    fn test_serde() {
        let amount = Amount::new(dec!(50.00));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"50.00\"");
        let back: Amount = serde_json::from_str("\"R$ 50,00\"").unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_overflow_becomes_zero() {
        let max = Amount::new(Decimal::MAX);
        assert_eq!(max + Amount::new(dec!(1)), Amount::ZERO);
        assert_eq!(Amount::new(Decimal::MIN) - Amount::new(dec!(1)), Amount::ZERO);
        assert_eq!(max.times(10), Amount::ZERO);
        assert_eq!(max.times(1), max);

        let total: Amount = vec![max, max, Amount::new(dec!(3))].into_iter().sum();
        assert_eq!(total, Amount::new(dec!(3)));

        let mut running = Amount::new(dec!(2.50));
        running += Amount::new(dec!(1.25));
        assert_eq!(running.value(), dec!(3.75));
        running += max;
        assert_eq!(running, Amount::ZERO);
    }
}
