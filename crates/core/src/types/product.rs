//! Product snapshot captured when an item enters a cart.

use serde::{Deserialize, Serialize};

use super::price::Price;

/// The parts of a catalog product a cart keeps.
///
/// This is a copy taken at add time, not a reference into the catalog: later
/// price or availability changes do not reach items already in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product title. Also the key duplicate adds are merged on.
    pub title: String,
    /// Unit price at the time the product was added.
    pub price: Price,
    /// Whether the product was orderable at the time it was added.
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}

impl ProductSnapshot {
    /// Create an available product snapshot.
    #[must_use]
    pub fn new(title: impl Into<String>, price: Price) -> Self {
        Self {
            title: title.into(),
            price,
            is_available: true,
        }
    }

    /// Set the availability flag.
    #[must_use]
    pub const fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }
}
