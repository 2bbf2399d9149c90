use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const NGN_CURRENCY_CODE: &str = "NGN";
pub const NGN_CURRENCY_CODE_LOWER: &str = "ngn";

/// Number of kobo in one naira. Some payment providers charge in minor units.
const KOBO_PER_NAIRA: i64 = 100;

//--------------------------------------       Naira       -----------------------------------------------------------
/// A whole-naira amount.
///
/// All amounts in the store (product prices, cart totals, order totals, payment amounts) are
/// expressed in whole naira. Conversion to kobo happens at the gateway boundary for providers
/// that charge in minor units.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Naira(i64);

impl Add for Naira {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Naira {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Naira {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Naira {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Naira {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for Naira {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Naira {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in naira: {0}")]
pub struct NairaConversionError(String);

impl From<i64> for Naira {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Naira {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Naira {}

impl TryFrom<u64> for Naira {
    type Error = NairaConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(NairaConversionError(format!("Value {value} is too large to convert to Naira")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Naira {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₦{}", self.0)
    }
}

impl Naira {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// The amount in minor units (kobo).
    pub fn to_kobo(&self) -> i64 {
        self.0 * KOBO_PER_NAIRA
    }

    /// Converts a minor-unit (kobo) amount as reported by a provider back into whole naira.
    /// Sub-naira remainders are truncated.
    pub fn from_kobo(kobo: i64) -> Self {
        Self(kobo / KOBO_PER_NAIRA)
    }

    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kobo_round_trip() {
        let amount = Naira::from(5000);
        assert_eq!(amount.to_kobo(), 500_000);
        assert_eq!(Naira::from_kobo(500_000), amount);
    }

    #[test]
    fn arithmetic() {
        let a = Naira::from(1500);
        let b = Naira::from(500);
        assert_eq!(a + b, Naira::from(2000));
        assert_eq!(a - b, Naira::from(1000));
        assert_eq!(b * 3, Naira::from(1500));
        let total: Naira = [a, b, b].into_iter().sum();
        assert_eq!(total, Naira::from(2500));
    }

    #[test]
    fn display_uses_currency_symbol() {
        assert_eq!(Naira::from(250).to_string(), "₦250");
    }
}
