//! # Monetary Amounts
//!
//! `Money` is an amount in minor units (cents, sen, …). Trip values are
//! computed upstream from order totals; this crate only carries, sums and
//! renders them. Amounts are integers on the wire.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A monetary amount in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

/// Minor units per major unit.
const MINOR_PER_MAJOR: i64 = 100;

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(0);

    /// From a raw minor-unit count.
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// From major and minor parts, e.g. `(1250, 75)` is `1250.75`.
    pub fn from_major_minor(major: i64, minor: u8) -> Result<Self, CoreError> {
        if i64::from(minor) >= MINOR_PER_MAJOR {
            return Err(CoreError::InvalidAmount(format!(
                "minor part {minor} must be below {MINOR_PER_MAJOR}"
            )));
        }
        major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| {
                if major < 0 {
                    m.checked_sub(i64::from(minor))
                } else {
                    m.checked_add(i64::from(minor))
                }
            })
            .map(Self)
            .ok_or_else(|| CoreError::InvalidAmount(format!("{major}.{minor:02} overflows")))
    }

    /// Raw minor-unit count.
    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Saturating addition.
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per, abs % per)
    }
}
