use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Monetary amount held at a fixed number of decimal places.
///
/// Parsed amounts and ledger balances stay below `MAX_UNITS` in magnitude,
/// which keeps report sums far inside the range of `Decimal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const DECIMALS: u32 = 2;
    pub const ZERO: Money = Money(Decimal::ZERO);
    /// Exclusive bound on the magnitude of any amount or balance.
    pub const MAX_UNITS: i64 = 1_000_000_000_000_000;

    /// Normalizes to `DECIMALS` places, ties go to the even neighbour.
    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp_with_strategy(Self::DECIMALS, RoundingStrategy::MidpointNearestEven))
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    fn bounded(value: Decimal) -> Option<Self> {
        let money = Self::new(value);
        (money.0.abs() < Decimal::from(Self::MAX_UNITS)).then_some(money)
    }

    /// `None` for blank, malformed or out of range input.
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        Decimal::from_str(s).ok().and_then(Self::bounded)
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).and_then(Self::bounded)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).and_then(Self::bounded)
    }

    /// Even share of `self` across `parts`, rounded like any other amount.
    /// Zero parts get nothing.
    pub fn split(self, parts: usize) -> Money {
        self.0
            .checked_div(Decimal::from(parts))
            .map(Self::new)
            .unwrap_or(Money::ZERO)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self::new(Decimal::from(value))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
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

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // zero never prints with a sign
        let mut value = if self.0.is_zero() {
            Decimal::ZERO
        } else {
            self.0
        };
        value.rescale(Self::DECIMALS);
        write!(f, "{}", value)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_decimal_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid Money format: {}", s)))
    }
}
