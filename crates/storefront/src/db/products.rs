//! Product repository for catalog lookups.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::debug;

use sessioncart_core::{Price, ProductId, ProductSnapshot};

use super::RepositoryError;

/// A product row as the cart needs it.
#[derive(Debug, FromRow)]
struct ProductRow {
    title: String,
    price: Decimal,
    is_available: bool,
}

impl ProductRow {
    fn into_snapshot(self, id: ProductId) -> Result<ProductSnapshot, RepositoryError> {
        let price = Price::new(self.price);
        price.check().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {id}: {e}"))
        })?;

        Ok(ProductSnapshot::new(self.title, price).with_availability(self.is_available))
    }
}

/// A product to insert into the catalog.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub full_description: String,
    pub price: Price,
    pub is_available: bool,
}

/// Repository for catalog product operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product snapshot by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<ProductSnapshot>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT title, price, is_available
            FROM catalog.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        debug!(product_id = %id, found = row.is_some(), "Catalog lookup");

        row.map(|r| r.into_snapshot(id)).transpose()
    }

    /// Check the catalog table can be queried.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self.pool).await?;
        Ok(())
    }
}

/// Catalog writes on a single connection.
///
/// Takes a connection rather than the pool so the caller can run several
/// writes inside one transaction.
pub struct ProductWriter<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ProductWriter<'a> {
    /// Create a writer over `conn` (a pooled connection or a transaction).
    #[must_use]
    pub const fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a product, returning its new ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&mut self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let (id,): (ProductId,) = sqlx::query_as(
            r"
            INSERT INTO catalog.product (title, full_description, price, is_available)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&product.title)
        .bind(&product.full_description)
        .bind(product.price.amount())
        .bind(product.is_available)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    /// Delete every product.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_all(&mut self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product")
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }
}
