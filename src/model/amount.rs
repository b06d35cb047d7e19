//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Amounts are stored in documents
//! as JSON numbers, but older documents and hand-typed input may carry them as strings, optionally
//! with a dollar sign and thousands separators, so both forms are accepted when reading.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use tracing::warn;

/// Represents a monetary amount in the shop's (single) currency.
///
/// # Examples
///
/// Parsing with thousands separators:
/// ```
/// # use cashbook::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$85,000").unwrap();
/// assert_eq!(amount.to_string(), "85,000.00");
/// ```
///
/// Arithmetic stays exact:
/// ```
/// # use cashbook::model::Amount;
/// let a = Amount::from(30000) + Amount::from(100000) - Amount::from(45000);
/// assert_eq!(a, Amount::from(85000));
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

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Converts a loosely-typed JSON value into an amount. Numbers and numeric strings are
    /// accepted; anything else (including `null` and non-numeric text) becomes zero.
    pub fn coerce(value: &serde_json::Value) -> Amount {
        match value {
            // Numbers keep their source text, so no digits are lost to a float conversion.
            serde_json::Value::Number(n) => Amount::coerce_str(&n.to_string()),
            serde_json::Value::String(s) => Amount::coerce_str(s),
            _ => Amount::ZERO,
        }
    }

    /// Parses `s`, falling back to zero when it is not numeric.
    pub fn coerce_str(s: &str) -> Amount {
        Amount::from_str(s).unwrap_or_else(|e| {
            warn!("Treating non-numeric amount '{s}' as zero: {e}");
            Amount::ZERO
        })
    }

    /// Parses user input for a new line item. Non-numeric input is coerced to zero (with a
    /// warning); negative amounts are rejected.
    pub fn parse_input(s: &str) -> Result<Amount, AmountError> {
        let amount = Amount::coerce_str(s);
        if amount.is_negative() {
            return Err(AmountError::Negative(amount.value()));
        }
        Ok(amount)
    }
}

/// An error that can occur when parsing strings into amounts.
pub enum AmountError {
    /// The text is not a number.
    Invalid(rust_decimal::Error),
    /// The number is below zero where only non-negative amounts are allowed.
    Negative(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Invalid(e) => Debug::fmt(e, f),
            AmountError::Negative(d) => write!(f, "Negative({d})"),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Invalid(e) => Display::fmt(e, f),
            AmountError::Negative(d) => write!(f, "amounts must not be negative, got {d}"),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmountError::Invalid(e) => Some(e),
            AmountError::Negative(_) => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // "-$50.00", "$50.00", "-50.00" and "50.00" are all accepted
        let without_dollar = match trimmed.strip_prefix('-') {
            Some(after_minus) => match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            },
            None => trimmed.strip_prefix('$').unwrap_or(trimmed).to_string(),
        };

        let without_commas = without_dollar.replace(',', "");
        let value = match Decimal::from_str(&without_commas) {
            Ok(value) => value,
            Err(e) if without_commas.contains(['e', 'E']) => {
                Decimal::from_scientific(&without_commas).map_err(|_| AmountError::Invalid(e))?
            }
            Err(e) => return Err(AmountError::Invalid(e)),
        };
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.abs().to_f64().unwrap_or_default();
        write!(f, "{sign}{}", format_num::format_num!(",.2", num))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Written as a JSON number with every digit of the decimal.
        rust_decimal::serde::arbitrary_precision::serialize(&self.0.normalize(), serializer)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Amount, E> {
        Decimal::from_i128(v)
            .map(Amount)
            .ok_or_else(|| E::custom(format!("{v} cannot be represented as an amount")))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        Decimal::from_u128(v)
            .map(Amount)
            .ok_or_else(|| E::custom(format!("{v} cannot be represented as an amount")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        // The shortest decimal text of `v`, rather than its binary expansion
        Amount::from_str(&v.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(v).map(Amount))
            .ok_or_else(|| E::custom(format!("{v} cannot be represented as an amount")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }

    /// serde_json hands exact numbers over as a map with a single private key.
    fn visit_map<A>(self, mut map: A) -> Result<Amount, A::Error>
    where
        A: MapAccess<'de>,
    {
        if map.next_key::<String>()?.is_none() {
            return Err(de::Error::custom("an empty map is not an amount"));
        }
        let text: String = map.next_value()?;
        Amount::from_str(&text).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

// Arithmetic saturates at the bounds of `Decimal` instead of panicking, so totals over stored
// data are always computable.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        *self = *self - rhs;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}
