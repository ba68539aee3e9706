//! Naira amounts using decimal arithmetic.
//!
//! Prices travel through the backend and the persisted cart as loosely
//! formatted strings (`"1000"`, `"₦1,500.50"`, occasionally garbage). Parsing
//! never fails: anything that does not start with a number is worth zero.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency symbol used for display.
pub const NAIRA_SYMBOL: char = '₦';

/// An amount of money in Naira.
///
/// Arithmetic is exact; call [`Money::round_minor`] (or [`Money::to_fixed`])
/// at the display and wire boundary only. Sums and products saturate at
/// [`Decimal::MAX`] / [`Decimal::MIN`] instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero Naira.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a loosely formatted price string. See [`parse_amount`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self(parse_amount(s))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to kobo (2 decimal places), midpoint away from zero.
    #[must_use]
    pub fn round_minor(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Fixed-point string with exactly two decimals and no symbol (`"2600.00"`).
    #[must_use]
    pub fn to_fixed(&self) -> String {
        let mut rounded = self.round_minor().0;
        rounded.rescale(2);
        rounded.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NAIRA_SYMBOL}{}", self.to_fixed())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Parse a price string leniently.
///
/// Strips the Naira symbol, surrounding whitespace and thousands separators,
/// then reads the longest leading decimal number. Malformed input yields zero.
///
/// ```
/// use cravii_core::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("₦1,500.50"), Decimal::new(150_050, 2));
/// assert_eq!(parse_amount("12 plates"), Decimal::from(12));
/// assert_eq!(parse_amount("free"), Decimal::ZERO);
/// ```
#[must_use]
pub fn parse_amount(s: &str) -> Decimal {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != NAIRA_SYMBOL && *c != ',')
        .collect();
    let cleaned = cleaned.trim_start();

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(cleaned)),
    };

    let mut seen_dot = false;
    let prefix_len = unsigned
        .char_indices()
        .take_while(|(_, c)| {
            if *c == '.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                c.is_ascii_digit()
            }
        })
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());

    let number = unsigned.get(..prefix_len).unwrap_or("").trim_end_matches('.');
    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return Decimal::ZERO;
    }

    let normalized = if number.starts_with('.') {
        format!("0{number}")
    } else {
        number.to_owned()
    };

    let value = Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO);
    if negative { -value } else { value }
}

/// Serde helper for amounts the backend sends as either strings or numbers.
///
/// ```
/// # use serde::Deserialize;
/// # use rust_decimal::Decimal;
/// #[derive(Deserialize)]
/// struct Fee {
///     #[serde(deserialize_with = "cravii_core::types::money::lenient_amount")]
///     vat_fee: Decimal,
/// }
///
/// let a: Fee = serde_json::from_str(r#"{"vat_fee": "100"}"#).unwrap();
/// let b: Fee = serde_json::from_str(r#"{"vat_fee": 100}"#).unwrap();
/// assert_eq!(a.vat_fee, b.vat_fee);
/// ```
///
/// # Errors
///
/// Returns a deserialization error for values that are neither strings nor
/// numbers. Malformed strings parse to zero, like [`parse_amount`].
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct LenientAmount;

    impl serde::de::Visitor<'_> for LenientAmount {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an amount as a string or number")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Decimal, E> {
            Ok(parse_amount(v))
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Decimal, E> {
            Decimal::from_f64(v).ok_or_else(|| E::custom(format!("amount {v} out of range")))
        }
    }

    deserializer.deserialize_any(LenientAmount)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain_and_symbol() {
        assert_eq!(parse_amount("1000"), dec("1000"));
        assert_eq!(parse_amount("₦1000"), dec("1000"));
        assert_eq!(parse_amount(" ₦ 250.75 "), dec("250.75"));
    }

    #[test]
    fn test_parse_thousands_separator() {
        assert_eq!(parse_amount("1,500"), dec("1500"));
    }

    #[test]
    fn test_parse_leading_number_only() {
        assert_eq!(parse_amount("12abc"), dec("12"));
        assert_eq!(parse_amount("3.5.1"), dec("3.5"));
        assert_eq!(parse_amount(".5"), dec("0.5"));
        assert_eq!(parse_amount("7."), dec("7"));
    }

    #[test]
    fn test_parse_malformed_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("."), Decimal::ZERO);
        assert_eq!(parse_amount("₦"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(parse_amount("-20"), dec("-20"));
    }

    #[test]
    fn test_to_fixed_pads_and_rounds() {
        assert_eq!(Money::new(dec("2600")).to_fixed(), "2600.00");
        assert_eq!(Money::new(dec("137.50015")).to_fixed(), "137.50");
        assert_eq!(Money::new(dec("0.125")).to_fixed(), "0.13");
    }

    #[test]
    fn test_display_has_symbol() {
        assert_eq!(Money::new(dec("80")).to_string(), "₦80.00");
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max + Money::new(dec("1")), max);
        assert_eq!(max * dec("2"), max);
        assert_eq!(Money::new(Decimal::MIN) * dec("2"), Money::new(Decimal::MIN));
        assert_eq!(max.round_minor(), max);
    }

    #[test]
    fn test_sum() {
        let total: Money = [dec("1"), dec("2.5")].into_iter().map(Money::new).sum();
        assert_eq!(total.amount(), dec("3.5"));
    }
}
