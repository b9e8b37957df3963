//! Non-negative currency amounts held as whole cents.
//!
//! Fixture files carry amounts as JSON decimals (`42.5`). Converting once at
//! the boundary keeps every sum in the store exact, so totals do not depend on
//! the order cases are visited in.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest accepted amount: $9,999,999,999.99, the range of a
    /// `Decimal128(12, 2)` column.
    pub const MAX: Money = Money(999_999_999_999);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Convert a decimal amount (dollars) to cents, rounding to the nearest cent.
    ///
    /// Returns `None` for negative, NaN, or infinite input, and for amounts
    /// above [`Money::MAX`].
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents > Self::MAX.0 as f64 {
            return None;
        }
        Some(Self(cents as u64))
    }

    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_decimal(value)
            .ok_or_else(|| D::Error::custom(format!("invalid amount {value}: must be between 0 and {}", Money::MAX)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_rounds_to_nearest_cent() {
        assert_eq!(Money::from_decimal(42.5), Some(Money::from_cents(4250)));
        assert_eq!(Money::from_decimal(18.2), Some(Money::from_cents(1820)));
        assert_eq!(Money::from_decimal(0.0), Some(Money::ZERO));
    }

    #[test]
    fn negative_and_non_finite_rejected() {
        assert_eq!(Money::from_decimal(-0.01), None);
        assert_eq!(Money::from_decimal(f64::NAN), None);
        assert_eq!(Money::from_decimal(f64::INFINITY), None);
    }

    #[test]
    fn display_formats_dollars() {
        assert_eq!(Money::from_cents(4250).to_string(), "$42.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn sum_of_empty_is_zero() {
        let empty: Vec<Money> = Vec::new();
        assert_eq!(empty.iter().sum::<Money>(), Money::ZERO);
    }

    #[test]
    fn amounts_above_max_rejected() {
        assert_eq!(Money::from_decimal(9_999_999_999.99), Some(Money::MAX));
        assert_eq!(Money::from_decimal(10_000_000_000.0), None);
        assert_eq!(Money::from_decimal(1e300), None);
        assert!(serde_json::from_str::<Money>("1e17").is_err());
    }

    #[test]
    fn addition_saturates() {
        let big = Money::from_cents(u64::MAX - 1);
        assert_eq!(big + Money::from_cents(5), Money::from_cents(u64::MAX));
        let mut acc = big;
        acc += big;
        assert_eq!(acc.cents(), u64::MAX);
        let total: Money = [big, big, Money::MAX].into_iter().sum();
        assert_eq!(total.cents(), u64::MAX);
    }

    #[test]
    fn deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Money>("-3.5").is_err());
        let m: Money = serde_json::from_str("38.75").unwrap();
        assert_eq!(m.cents(), 3875);
    }
}
