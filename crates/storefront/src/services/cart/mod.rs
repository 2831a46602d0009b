//! Cart service.
//!
//! [`CartManager`] applies cart mutations to a working copy loaded from a
//! [`sessioncart_core::CartStorage`]; [`SessionCartStorage`] is the storage
//! the HTTP handlers bind it to.

mod manager;
mod storage;

use serde::Deserialize;

use sessioncart_core::ProductId;

pub use manager::CartManager;
pub use storage::SessionCartStorage;

/// Count used when an add request does not specify one.
pub const DEFAULT_ADD_COUNT: i64 = 1;

/// Body of an add-to-cart request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddItemRequest {
    /// Catalog product to add.
    pub product: Option<ProductId>,
    /// How many to add when the product is not yet in the cart.
    pub count: Option<i64>,
}

impl AddItemRequest {
    /// Request adding `count` of `product`.
    #[must_use]
    pub const fn new(product: ProductId, count: Option<i64>) -> Self {
        Self {
            product: Some(product),
            count,
        }
    }
}
