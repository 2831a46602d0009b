//! Cart line items.

use serde::{Deserialize, Serialize};

use super::id::LineItemId;
use super::price::Price;
use super::product::ProductSnapshot;
use crate::error::ValidationError;

/// Longest product title a line item may carry (the catalog column width).
pub const MAX_TITLE_LENGTH: usize = 255;

/// One distinct product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Cart-local ID, unique within the cart.
    pub id: LineItemId,
    /// Snapshot of the product as it was when added.
    pub product: ProductSnapshot,
    /// Quantity. Always at least 1 for a stored item.
    pub count: i64,
}

impl CartLineItem {
    /// Create a line item.
    ///
    /// Nothing is checked here; see [`CartLineItem::validate`].
    #[must_use]
    pub const fn new(id: LineItemId, product: ProductSnapshot, count: i64) -> Self {
        Self { id, product, count }
    }

    /// Unit price times count, or `None` if that overflows.
    #[must_use]
    pub fn total_price(&self) -> Option<Price> {
        self.product.price.times(self.count)
    }

    /// Check the item against the shape every stored line item must have.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidCount` for a count below 1 and
    /// `ValidationError::MalformedItem` for any other violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.as_i32() < 1 {
            return Err(ValidationError::MalformedItem(format!(
                "id must be a positive integer (got {})",
                self.id
            )));
        }

        let title = self.product.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MalformedItem(
                "product title cannot be empty".to_string(),
            ));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ValidationError::MalformedItem(format!(
                "product title must be at most {MAX_TITLE_LENGTH} characters"
            )));
        }

        self.product
            .price
            .check()
            .map_err(|e| ValidationError::MalformedItem(format!("product {e}")))?;

        if self.count < 1 {
            return Err(ValidationError::InvalidCount(self.count));
        }

        if self.total_price().is_none() {
            return Err(ValidationError::MalformedItem(
                "total price overflows".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(count: i64) -> CartLineItem {
        CartLineItem::new(
            LineItemId::new(1),
            ProductSnapshot::new("Dish soap", Price::from_cents(250)),
            count,
        )
    }

    #[test]
    fn test_total_price() {
        assert_eq!(item(4).total_price(), Some(Price::from_cents(1000)));
    }

    #[test]
    fn test_validate_accepts_well_formed_item() {
        assert!(item(1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        assert_eq!(item(0).validate(), Err(ValidationError::InvalidCount(0)));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut bad = item(1);
        bad.product.title = "   ".to_string();
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::MalformedItem(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_price() {
        let mut bad = item(1);
        bad.product.price = Price::new(Decimal::new(-100, 2));
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::MalformedItem(msg)) if msg.contains("negative")
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_id() {
        let mut bad = item(1);
        bad.id = LineItemId::new(0);
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::MalformedItem(_))
        ));
    }

    #[test]
    fn test_stored_shape() {
        let json = serde_json::to_value(item(2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "product": {"title": "Dish soap", "price": "2.50", "is_available": true},
                "count": 2
            })
        );
    }

    #[test]
    fn test_stored_shape_without_availability_defaults_to_available() {
        let parsed: CartLineItem = serde_json::from_value(serde_json::json!({
            "id": 3,
            "product": {"title": "Bleach", "price": "4.10"},
            "count": 1
        }))
        .unwrap();
        assert!(parsed.product.is_available);
        assert_eq!(parsed.product.price, Price::from_cents(410));
    }
}
