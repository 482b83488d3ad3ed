//! Type-safe cost and rating representations.
//!
//! Costs use decimal arithmetic so cart totals never drift the way binary
//! floating point does. On the wire the backend sends plain JSON numbers
//! (`"cost": 100`), which is what [`Cost`] reads and writes.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Cost`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    /// The amount is below zero.
    #[error("cost cannot be negative (got {0})")]
    Negative(Decimal),
}

/// The price of a single unit of a product.
///
/// Always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cost(Decimal);

impl Cost {
    /// A zero cost.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a cost from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`CostError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, CostError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CostError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a cost from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Cost of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Cost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Format a decimal amount the way costs are displayed.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("${amount:.2}")
}

/// Aggregate product rating, an integer out of five.
///
/// Out-of-range values from the backend are clamped rather than rejected so a
/// single bad record can't hide the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Highest possible rating.
    pub const MAX: u8 = 5;

    /// Create a rating, clamping to `0..=5`.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// The rating value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Render as filled/empty stars, e.g. `★★★★☆`.
    #[must_use]
    pub fn stars(&self) -> String {
        let filled = usize::from(self.0);
        let empty = usize::from(Self::MAX) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl From<u8> for Rating {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}
