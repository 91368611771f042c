//! Fixed-point monetary amounts.
//!
//! The original listings carry display-ready price strings ("93", "95000") and
//! the cart multiplies/sums them. Doing that in binary floating point drifts
//! at cent level, so amounts are held in the smallest currency unit (cents)
//! and only formatted back to a two-fraction-digit decimal string at the
//! presentation boundary.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Minor units per major unit (cents per whole).
const SCALE: u64 = 100;

/// A non-negative monetary amount in minor units (cents).
///
/// Parses from decimal strings with at most two fraction digits and renders
/// with exactly two, so `"93".parse()` and `"93.00".parse()` are the same
/// amount and both display as `93.00`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from an amount already expressed in minor units.
    pub fn from_minor_units(minor_units: u64) -> Self {
        Self(minor_units)
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }

    /// Saturating variants back up total recomputation over already-applied
    /// events; commands reject amounts that would overflow before they are
    /// ever applied.
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    pub fn saturating_mul(self, factor: u64) -> Money {
        Money(self.0.saturating_mul(factor))
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / SCALE, self.0 % SCALE)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (s, None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "malformed monetary amount: {s:?}"
            )));
        }
        let units: u64 = whole
            .parse()
            .map_err(|_| DomainError::validation(format!("monetary amount out of range: {s:?}")))?;

        let cents = match fraction {
            None => 0,
            Some(f) => {
                if f.is_empty() || f.len() > 2 || !f.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DomainError::validation(format!(
                        "monetary amounts carry at most two fraction digits: {s:?}"
                    )));
                }
                let v: u64 = f
                    .parse()
                    .map_err(|_| DomainError::validation(format!("malformed monetary amount: {s:?}")))?;
                if f.len() == 1 { v * 10 } else { v }
            }
        };

        units
            .checked_mul(SCALE)
            .and_then(|m| m.checked_add(cents))
            .map(Money)
            .ok_or_else(|| DomainError::validation(format!("monetary amount out of range: {s:?}")))
    }
}
