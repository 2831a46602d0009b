//! Product catalog with lookup caching.
//!
//! Resolves product IDs for the cart from `PostgreSQL` (or an in-memory
//! catalog when no database is configured). Found products are cached with
//! `moka`; misses are not cached so a newly seeded product shows up at once.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use sessioncart_core::{InMemoryCatalog, LookupError, ProductId, ProductLookup, ProductSnapshot};

use crate::db::{ProductRepository, RepositoryError};

/// Maximum number of cached products.
const CACHE_CAPACITY: u64 = 10_000;

/// Where products come from.
#[derive(Debug)]
enum Backend {
    Postgres(PgPool),
    Memory(InMemoryCatalog),
}

/// Catalog client shared by all requests.
///
/// Cheap to clone; clones share the cache.
#[derive(Debug, Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

#[derive(Debug)]
struct CatalogInner {
    backend: Backend,
    cache: Cache<ProductId, ProductSnapshot>,
}

impl Catalog {
    /// Catalog backed by the `catalog.product` table.
    #[must_use]
    pub fn postgres(pool: PgPool, ttl: Duration) -> Self {
        Self::with_backend(Backend::Postgres(pool), ttl)
    }

    /// Catalog backed by a fixed set of products.
    #[must_use]
    pub fn in_memory(catalog: InMemoryCatalog, ttl: Duration) -> Self {
        Self::with_backend(Backend::Memory(catalog), ttl)
    }

    fn with_backend(backend: Backend, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogInner { backend, cache }),
        }
    }

    /// Check the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database cannot be queried.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match &self.inner.backend {
            Backend::Postgres(pool) => ProductRepository::new(pool).ping().await,
            Backend::Memory(_) => Ok(()),
        }
    }

    async fn fetch(&self, id: ProductId) -> Result<ProductSnapshot, LookupError> {
        match &self.inner.backend {
            Backend::Postgres(pool) => ProductRepository::new(pool)
                .get_by_id(id)
                .await
                .map_err(|e| LookupError::Backend(e.to_string()))?
                .ok_or(LookupError::NotFound(id)),
            Backend::Memory(catalog) => catalog.resolve(id).await,
        }
    }
}

impl ProductLookup for Catalog {
    async fn resolve(&self, id: ProductId) -> Result<ProductSnapshot, LookupError> {
        if let Some(product) = self.inner.cache.get(&id).await {
            debug!(product_id = %id, "Cache hit for product");
            return Ok(product);
        }

        let product = self.fetch(id).await?;
        self.inner.cache.insert(id, product.clone()).await;
        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sessioncart_core::Price;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::in_memory(
            InMemoryCatalog::new().with_product(
                ProductId::new(1),
                ProductSnapshot::new("A", Price::from_cents(1000)),
            ),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_resolve_caches_found_products() {
        let catalog = catalog();

        let product = catalog.resolve(ProductId::new(1)).await.unwrap();

        assert_eq!(product.title, "A");
        assert!(catalog.inner.cache.get(&ProductId::new(1)).await.is_some());
    }

    #[tokio::test]
    async fn test_resolve_does_not_cache_misses() {
        let catalog = catalog();

        let err = catalog.resolve(ProductId::new(2)).await.unwrap_err();

        assert_eq!(err, LookupError::NotFound(ProductId::new(2)));
        assert!(catalog.inner.cache.get(&ProductId::new(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_in_memory_ping() {
        assert!(catalog().ping().await.is_ok());
    }
}
