//! The working cart and its mutation rules.
//!
//! [`Cart`] is the in-memory copy of one session's line items. It knows how to
//! merge duplicate adds, hand out line item IDs, and apply quantity changes;
//! it knows nothing about where the items are stored. Loading and committing
//! is the job of whoever owns the storage (see `CartStorage`).
//!
//! # Rules
//!
//! - Items are unique by product title. Adding a title that is already in the
//!   cart bumps that item's count by one instead of creating a second entry.
//! - New items get `max(existing ids) + 1`. IDs are never renumbered, so an
//!   ID freed by a removal is not handed out again while a higher one exists.
//! - A quantity change that leaves the count at zero or below removes the item.

use serde::{Deserialize, Serialize};

use crate::error::{CartError, ValidationError};
use crate::types::{CartLineItem, LineItemId, ProductSnapshot};

/// What [`Cart::add_product`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line item was appended.
    Created(LineItemId),
    /// An item with the same title existed; its count went up by one.
    Merged(LineItemId),
}

impl AddOutcome {
    /// The ID of the line item that was created or merged into.
    #[must_use]
    pub const fn item_id(&self) -> LineItemId {
        match self {
            Self::Created(id) | Self::Merged(id) => *id,
        }
    }
}

/// What [`Cart::adjust_quantity`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// The item is still in the cart with this count.
    Updated(i64),
    /// The count dropped to zero or below and the item was removed.
    Removed,
}

/// An ordered list of line items for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart, returning its line items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line item by ID.
    #[must_use]
    pub fn get(&self, id: LineItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// First line item whose product title equals `title`.
    #[must_use]
    pub fn find_by_title(&self, title: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.product.title == title)
    }

    /// The ID the next created line item will get.
    #[must_use]
    pub fn next_id(&self) -> LineItemId {
        self.items
            .iter()
            .map(|item| item.id)
            .max()
            .unwrap_or(LineItemId::new(0))
            .next()
    }

    /// Add a product, merging with an existing item of the same title.
    ///
    /// When the title is already present the existing item's count goes up by
    /// exactly one, whatever `count` asks for, and nothing else is checked.
    /// Otherwise a new item is assembled with `count` and validated before it
    /// is appended.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if the new item is not well formed.
    /// The cart is unchanged on error.
    pub fn add_product(
        &mut self,
        product: ProductSnapshot,
        count: i64,
    ) -> Result<AddOutcome, CartError> {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product.title == product.title)
        {
            existing.count = existing.count.checked_add(1).ok_or_else(|| {
                ValidationError::MalformedItem("count overflows".to_string())
            })?;
            return Ok(AddOutcome::Merged(existing.id));
        }

        let item = CartLineItem::new(self.next_id(), product, count);
        item.validate()?;

        let id = item.id;
        self.items.push(item);
        Ok(AddOutcome::Created(id))
    }

    /// Remove the line item with this ID.
    ///
    /// Returns whether an item was removed. Removing an absent ID is a no-op.
    pub fn remove(&mut self, id: LineItemId) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Add `delta` to an item's count, removing the item if it reaches zero.
    ///
    /// Counts never go negative: any result at or below zero removes the item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no item has this ID (including when
    /// the cart is empty), or a validation error if the count would overflow.
    /// The cart is unchanged on error.
    pub fn adjust_quantity(
        &mut self,
        id: LineItemId,
        delta: i64,
    ) -> Result<QuantityOutcome, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::ItemNotFound(id))?;

        let Some(item) = self.items.get_mut(index) else {
            return Err(CartError::ItemNotFound(id));
        };

        let count = item
            .count
            .checked_add(delta)
            .ok_or_else(|| ValidationError::MalformedItem("count overflows".to_string()))?;

        if count <= 0 {
            self.items.remove(index);
            return Ok(QuantityOutcome::Removed);
        }

        item.count = count;
        Ok(QuantityOutcome::Updated(count))
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Price;

    fn product(title: &str, cents: i64) -> ProductSnapshot {
        ProductSnapshot::new(title, Price::from_cents(cents))
    }

    #[test]
    fn test_add_unseen_product_creates_item_with_requested_count() {
        let mut cart = Cart::new();

        let outcome = cart.add_product(product("A", 1000), 3).unwrap();

        assert_eq!(outcome, AddOutcome::Created(LineItemId::new(1)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].count, 3);
    }

    #[test]
    fn test_add_existing_title_increments_by_one_regardless_of_count() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 1000), 1).unwrap();

        let outcome = cart.add_product(product("A", 1000), 5).unwrap();

        assert_eq!(outcome, AddOutcome::Merged(LineItemId::new(1)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].count, 2);
    }

    #[test]
    fn test_merge_keeps_original_snapshot() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 1000), 1).unwrap();

        // Catalog price changed since the first add.
        cart.add_product(product("A", 1500), 1).unwrap();

        assert_eq!(cart.items()[0].product.price, Price::from_cents(1000));
    }

    #[test]
    fn test_merge_skips_count_validation() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 1000), 1).unwrap();

        let outcome = cart.add_product(product("A", 1000), 0).unwrap();

        assert_eq!(outcome, AddOutcome::Merged(LineItemId::new(1)));
        assert_eq!(cart.items()[0].count, 2);
    }

    #[test]
    fn test_add_rejects_invalid_new_item_and_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 1000), 1).unwrap();
        let before = cart.clone();

        let err = cart.add_product(product("B", 500), 0).unwrap_err();

        assert!(matches!(
            err,
            CartError::Validation(ValidationError::InvalidCount(0))
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_next_id_uses_max_plus_one() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 100), 1).unwrap();
        cart.add_product(product("B", 100), 1).unwrap();
        cart.remove(LineItemId::new(1));

        // [id=2] remains; len+1 would collide with it.
        assert_eq!(cart.next_id(), LineItemId::new(3));
        let outcome = cart.add_product(product("C", 100), 1).unwrap();
        assert_eq!(outcome.item_id(), LineItemId::new(3));
    }

    #[test]
    fn test_next_id_on_empty_cart_is_one() {
        assert_eq!(Cart::new().next_id(), LineItemId::new(1));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 100), 1).unwrap();
        cart.add_product(product("B", 100), 1).unwrap();

        assert!(cart.remove(LineItemId::new(1)));
        let once = cart.clone();
        assert!(!cart.remove(LineItemId::new(1)));

        assert_eq!(cart, once);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_adjust_quantity_updates_count() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 100), 1).unwrap();

        let outcome = cart.adjust_quantity(LineItemId::new(1), 1).unwrap();

        assert_eq!(outcome, QuantityOutcome::Updated(2));
        assert_eq!(cart.items()[0].count, 2);
    }

    #[test]
    fn test_adjust_quantity_to_zero_removes_item() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 100), 1).unwrap();

        let outcome = cart.adjust_quantity(LineItemId::new(1), -1).unwrap();

        assert_eq!(outcome, QuantityOutcome::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_adjust_quantity_below_zero_removes_item() {
        let mut cart = Cart::new();
        cart.add_product(product("A", 100), 1).unwrap();

        let outcome = cart.adjust_quantity(LineItemId::new(1), -2).unwrap();

        assert_eq!(outcome, QuantityOutcome::Removed);
        assert!(cart.get(LineItemId::new(1)).is_none());
    }

    #[test]
    fn test_adjust_quantity_missing_item() {
        let mut cart = Cart::new();
        for delta in [-1, 0, 1, 10] {
            assert!(matches!(
                cart.adjust_quantity(LineItemId::new(1), delta),
                Err(CartError::ItemNotFound(id)) if id == LineItemId::new(1)
            ));
        }

        cart.add_product(product("A", 100), 1).unwrap();
        let before = cart.clone();
        assert!(matches!(
            cart.adjust_quantity(LineItemId::new(9), 1),
            Err(CartError::ItemNotFound(_))
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_adjust_quantity_overflow_is_rejected() {
        let mut cart = Cart::from(vec![CartLineItem::new(
            LineItemId::new(1),
            product("A", 1),
            i64::MAX,
        )]);

        assert!(matches!(
            cart.adjust_quantity(LineItemId::new(1), 1),
            Err(CartError::Validation(ValidationError::MalformedItem(_)))
        ));
        assert_eq!(cart.items()[0].count, i64::MAX);
    }

    #[test]
    fn test_walkthrough() {
        let mut cart = Cart::new();

        cart.add_product(product("A", 1000), 1).unwrap();
        cart.add_product(product("A", 1000), 1).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].count, 2);

        cart.add_product(product("B", 500), 1).unwrap();
        assert_eq!(cart.items()[1].id, LineItemId::new(2));

        cart.adjust_quantity(LineItemId::new(1), -2).unwrap();

        assert_eq!(
            cart.into_items(),
            vec![CartLineItem::new(LineItemId::new(2), product("B", 500), 1)]
        );
    }
}
