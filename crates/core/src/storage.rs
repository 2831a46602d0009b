//! Cart storage port.
//!
//! A [`CartStorage`] owns the durable copy of one session's cart. Whoever
//! mutates a cart loads a working copy, changes it, and saves it back in a
//! single write. Implementations decide where the list lives (an HTTP session
//! record, a cache, memory) without the mutation code knowing.

use std::convert::Infallible;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use crate::types::CartLineItem;

/// Load and save the cart of one session.
///
/// # Implementation Notes
///
/// - `load` returns an empty list when nothing has been stored yet; a missing
///   cart is not an error
/// - `save` replaces the whole stored list and must leave the backing store
///   marked as modified so it actually gets flushed
pub trait CartStorage: Send + Sync {
    /// Error raised by the backing store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the stored line items.
    fn load(&self) -> impl Future<Output = Result<Vec<CartLineItem>, Self::Error>> + Send;

    /// Replace the stored line items.
    fn save(&self, items: &[CartLineItem]) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Cart storage held in process memory.
///
/// Clones share the same underlying list, so a test can keep a handle and
/// inspect what a manager committed.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    inner: Arc<Mutex<MemoryCart>>,
}

#[derive(Debug, Default)]
struct MemoryCart {
    items: Vec<CartLineItem>,
    saves: usize,
}

impl MemoryCartStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage that already holds these items.
    #[must_use]
    pub fn with_items(items: Vec<CartLineItem>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryCart { items, saves: 0 })),
        }
    }

    /// Current stored items.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLineItem> {
        self.lock().items.clone()
    }

    /// How many times `save` has been called.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryCart> {
        // The guarded data is a plain list; a panic elsewhere cannot leave it torn.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryCartStorage {
    type Error = Infallible;

    async fn load(&self) -> Result<Vec<CartLineItem>, Self::Error> {
        Ok(self.snapshot())
    }

    async fn save(&self, items: &[CartLineItem]) -> Result<(), Self::Error> {
        let mut cart = self.lock();
        cart.items = items.to_vec();
        cart.saves += 1;
        Ok(())
    }
}
