//! POLYX and asset amounts.

use crate::error::{TypeError, TypeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// Number of decimal places of a [`Balance`].
pub const BALANCE_DECIMALS: u32 = 6;

/// Number of base units in one whole unit.
pub const UNIT: u128 = 1_000_000;

/// The largest amount the chain accepts for asset supplies.
pub const MAX_BALANCE: Balance = Balance(1_000_000_000_000 * UNIT);

/// An amount expressed in base units (one millionth of a whole unit).
///
/// Arithmetic is explicit: use [`Balance::checked_add`] and friends, or
/// [`Balance::saturating_add`] where overflow is not a concern.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(u128);

impl Balance {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates a balance from base units.
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Creates a balance from whole units.
    pub const fn from_units(units: u64) -> Self {
        Self(units as u128 * UNIT)
    }

    /// Returns the amount in base units.
    pub const fn base_units(&self) -> u128 {
        self.0
    }

    /// Returns true if the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount has no fractional part.
    pub const fn is_whole(&self) -> bool {
        self.0 % UNIT == 0
    }

    /// Adds two balances, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Subtracts, returning `None` on underflow.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Multiplies by an integer factor, returning `None` on overflow.
    pub fn checked_mul(self, factor: u32) -> Option<Self> {
        self.0.checked_mul(u128::from(factor)).map(Self)
    }

    /// Adds two balances, clamping at the numeric bound.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies by an integer factor, clamping at the numeric bound.
    pub fn saturating_mul(self, factor: u32) -> Self {
        Self(self.0.saturating_mul(u128::from(factor)))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / UNIT, self.0 % UNIT)
    }
}

impl fmt::Debug for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Balance({self})")
    }
}

impl FromStr for Balance {
    type Err = TypeError;

    /// Parses a decimal string such as `"12"` or `"0.25"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidBalance(s.to_string());
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));

        if whole.is_empty() || fraction.len() > BALANCE_DECIMALS as usize {
            return Err(invalid());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: u128 = whole.parse().map_err(|_| invalid())?;
        let padded = format!("{fraction:0<6}");
        let fraction: u128 = padded.parse().map_err(|_| invalid())?;

        whole
            .checked_mul(UNIT)
            .and_then(|w| w.checked_add(fraction))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Sum for Balance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

/// Parses a balance, mapping failures to [`TypeError::InvalidBalance`].
pub fn parse_balance(value: &str) -> TypeResult<Balance> {
    value.parse()
}
