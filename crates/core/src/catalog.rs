//! Product lookup port.
//!
//! Carts never hold live catalog rows. When an item is added, the product is
//! resolved once through a [`ProductLookup`] and the result is copied into the
//! line item. Retries and caching are up to the implementation.

use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

use crate::types::{ProductId, ProductSnapshot};

/// Errors a product lookup can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No product has this ID.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The catalog could not be queried.
    #[error("catalog unavailable: {0}")]
    Backend(String),
}

/// Resolve a product ID to its current catalog snapshot.
pub trait ProductLookup: Send + Sync {
    /// Look up a product.
    fn resolve(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<ProductSnapshot, LookupError>> + Send;
}

/// A fixed catalog kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<ProductId, ProductSnapshot>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product, replacing any existing one with the same ID.
    #[must_use]
    pub fn with_product(mut self, id: ProductId, product: ProductSnapshot) -> Self {
        self.insert(id, product);
        self
    }

    /// Add a product, replacing any existing one with the same ID.
    pub fn insert(&mut self, id: ProductId, product: ProductSnapshot) {
        self.products.insert(id, product);
    }

    /// Look up a product without going through the async trait.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&ProductSnapshot> {
        self.products.get(&id)
    }
}

impl ProductLookup for InMemoryCatalog {
    async fn resolve(&self, id: ProductId) -> Result<ProductSnapshot, LookupError> {
        self.get(id).cloned().ok_or(LookupError::NotFound(id))
    }
}
