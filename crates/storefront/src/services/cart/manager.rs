//! Scoped cart manager.
//!
//! A [`CartManager`] is created per request: [`CartManager::load`] reads the
//! session's cart into a working copy, the mutation methods change only that
//! copy, and [`CartManager::commit`] writes it back in a single `save`.
//! Dropping a manager without committing discards every change.

use tracing::{debug, instrument, warn};

use sessioncart_core::{
    AddOutcome, Cart, CartError, CartLineItem, CartStorage, LineItemId, LookupError,
    ProductLookup, QuantityOutcome, ValidationError,
};

use super::{AddItemRequest, DEFAULT_ADD_COUNT};

/// Working copy of one session's cart, bound to where it came from.
pub struct CartManager<S: CartStorage> {
    storage: S,
    cart: Cart,
    dirty: bool,
    committed: bool,
}

impl<S: CartStorage> CartManager<S> {
    /// Load the cart from `storage` into a fresh working copy.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the stored cart cannot be read.
    pub async fn load(storage: S) -> Result<Self, CartError> {
        let items = storage.load().await.map_err(CartError::storage)?;

        Ok(Self {
            storage,
            cart: Cart::from(items),
            dirty: false,
            committed: false,
        })
    }

    /// The working cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Line items of the working cart, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        self.cart.items()
    }

    /// Add a catalog product to the cart.
    ///
    /// A product whose title is already in the cart bumps that item's count by
    /// one. Otherwise a new item is created with the requested count
    /// (default 1).
    ///
    /// # Errors
    ///
    /// - `ValidationError::MissingProduct` if no product was given
    /// - `CartError::ProductNotFound` if the catalog cannot resolve it
    /// - `CartError::Validation` if the new item is not well formed
    #[instrument(skip(self, request, catalog), fields(product_id = tracing::field::Empty, count = ?request.count))]
    pub async fn add_to_cart<C>(
        &mut self,
        request: &AddItemRequest,
        catalog: &C,
    ) -> Result<AddOutcome, CartError>
    where
        C: ProductLookup,
    {
        let product_id = request.product.ok_or(ValidationError::MissingProduct)?;
        tracing::Span::current().record("product_id", tracing::field::display(product_id));

        let product = catalog.resolve(product_id).await.map_err(|err| {
            if let LookupError::Backend(reason) = &err {
                warn!(%product_id, error = %reason, "Product lookup failed");
            }
            CartError::ProductNotFound(product_id)
        })?;

        let outcome = self
            .cart
            .add_product(product, request.count.unwrap_or(DEFAULT_ADD_COUNT))?;
        self.dirty = true;

        debug!(item_id = %outcome.item_id(), ?outcome, "Added product to cart");
        Ok(outcome)
    }

    /// Remove a line item. Removing an item that is not there is not an error.
    pub fn remove_from_cart(&mut self, id: LineItemId) {
        if self.cart.remove(id) {
            self.dirty = true;
            debug!(item_id = %id, "Removed cart item");
        } else {
            debug!(item_id = %id, "Cart item already absent");
        }
    }

    /// Change an item's count by `delta`, removing it when the count reaches
    /// zero or below.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the cart has no item with this ID.
    pub fn update_quantity(
        &mut self,
        id: LineItemId,
        delta: i64,
    ) -> Result<QuantityOutcome, CartError> {
        let outcome = self.cart.adjust_quantity(id, delta)?;
        self.dirty = true;

        debug!(item_id = %id, delta, ?outcome, "Updated cart item quantity");
        Ok(outcome)
    }

    /// Write the working cart back to storage.
    ///
    /// Always saves, even when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the save fails.
    pub async fn commit(mut self) -> Result<(), CartError> {
        self.storage
            .save(self.cart.items())
            .await
            .map_err(CartError::storage)?;
        self.committed = true;
        Ok(())
    }
}

impl<S: CartStorage> Drop for CartManager<S> {
    fn drop(&mut self) {
        if self.dirty && !self.committed {
            debug!(
                items = self.cart.len(),
                "Discarding uncommitted cart changes"
            );
        }
    }
}

impl<S: CartStorage> std::fmt::Debug for CartManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("cart", &self.cart)
            .field("dirty", &self.dirty)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}
