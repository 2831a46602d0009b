//! Cart error types.
//!
//! Every failure a cart operation can report. None of them leave the working
//! cart half-updated: operations check before they mutate, and a manager
//! only persists its working cart when the caller commits.

use thiserror::Error;

use crate::types::{LineItemId, ProductId};

/// Input that cannot become a valid line item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The add request carried no product identifier.
    #[error("product is required")]
    MissingProduct,

    /// Requested or resulting count is below 1.
    #[error("count must be at least 1 (got {0})")]
    InvalidCount(i64),

    /// The assembled line item does not have the stored shape.
    #[error("malformed cart item: {0}")]
    MalformedItem(String),
}

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The product could not be resolved from the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// No line item in the cart has this ID.
    #[error("Cart item not found")]
    ItemNotFound(LineItemId),

    /// The cart could not be loaded from or saved to its storage.
    #[error("cart storage error: {0}")]
    Storage(String),
}

impl CartError {
    /// Wrap a storage backend error.
    pub fn storage(err: impl std::error::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
