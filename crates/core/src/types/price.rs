//! Type-safe price representation using decimal arithmetic.
//!
//! Prices follow the catalog column they come from (`NUMERIC(10, 2)`): at most
//! ten digits, two of them after the decimal point. On the wire they are
//! always written as strings with exactly two decimal places (`"10.00"`), so
//! clients never see float rounding or a varying number of places.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Total number of digits a price may have.
pub const MAX_DIGITS: u32 = 10;

/// Number of digits after the decimal point.
pub const DECIMAL_PLACES: u32 = 2;

/// Errors that can occur when checking a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than [`DECIMAL_PLACES`] places after the point.
    #[error("price must have at most {DECIMAL_PLACES} decimal places")]
    TooManyDecimalPlaces,
    /// The amount has more than [`MAX_DIGITS`] digits in total.
    #[error("price must have at most {MAX_DIGITS} digits")]
    TooManyDigits,
    /// The input could not be parsed as a decimal.
    #[error("invalid decimal: {0}")]
    Parse(String),
}

/// A non-negative monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    ///
    /// The amount is not checked; call [`Price::check`] before trusting it.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, DECIMAL_PLACES))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn times(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Check the amount fits `NUMERIC(10, 2)` and is not negative.
    ///
    /// # Errors
    ///
    /// Returns the first [`PriceError`] the amount violates.
    pub fn check(&self) -> Result<(), PriceError> {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            return Err(PriceError::Negative);
        }

        let normalized = self.0.normalize();
        if normalized.scale() > DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces);
        }

        let max_whole = Decimal::from(10_i64.pow(MAX_DIGITS - DECIMAL_PLACES));
        if normalized.trunc() >= max_whole {
            return Err(PriceError::TooManyDigits);
        }

        Ok(())
    }

    /// The amount rescaled to exactly two decimal places.
    fn rescaled(self) -> Decimal {
        let mut amount = self.0;
        amount.rescale(DECIMAL_PLACES);
        amount
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rescaled())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|e| PriceError::Parse(e.to_string()))?;
        let price = Self(amount);
        price.check()?;
        Ok(price)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accepts both "10.00" and 10.0; the stored form is always the string.
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}
