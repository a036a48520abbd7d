//! Amounts: a decimal quantity paired with an opaque unit label.

use std::fmt;
use std::ops::Neg;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::intern::InternedStr;

/// A decimal quantity with a unit.
///
/// The unit is an opaque label (`CNY`, `USD`, ...); folio never converts
/// between units. Trade amounts carry their sign in `number`, so a
/// withdrawal is simply a negative amount.
///
/// # Examples
///
/// ```
/// use folio_core::Amount;
/// use rust_decimal_macros::dec;
///
/// let contribution = Amount::new(dec!(3000), "CNY");
/// assert!(contribution.is_positive());
///
/// let withdrawal = -&contribution;
/// assert_eq!(withdrawal.number, dec!(-3000));
/// assert_eq!(withdrawal.unit, "CNY");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The signed decimal quantity.
    pub number: Decimal,
    /// The unit label, e.g. `CNY`.
    pub unit: InternedStr,
}

impl Amount {
    /// Create a new amount.
    pub fn new(number: Decimal, unit: impl Into<InternedStr>) -> Self {
        Self {
            number,
            unit: unit.into(),
        }
    }

    /// A zero amount in the given unit.
    pub fn zero(unit: impl Into<InternedStr>) -> Self {
        Self::new(Decimal::ZERO, unit)
    }

    /// Whether the quantity is exactly zero.
    pub const fn is_zero(&self) -> bool {
        self.number.is_zero()
    }

    /// Whether the quantity is strictly positive.
    pub const fn is_positive(&self) -> bool {
        self.number.is_sign_positive() && !self.number.is_zero()
    }

    /// Whether the quantity is negative.
    pub const fn is_negative(&self) -> bool {
        self.number.is_sign_negative() && !self.number.is_zero()
    }

    /// The absolute value, keeping the unit.
    pub fn abs(&self) -> Self {
        Self {
            number: self.number.abs(),
            unit: self.unit.clone(),
        }
    }

    /// Add another amount if the units match.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        (self.unit == other.unit).then(|| Self {
            number: self.number + other.number,
            unit: self.unit.clone(),
        })
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount {
            number: -self.number,
            unit: self.unit.clone(),
        }
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            number: -self.number,
            unit: self.unit,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.unit)
    }
}
