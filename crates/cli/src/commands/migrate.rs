//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cart-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Applies the catalog migrations in `crates/storefront/migrations/`, then
//! creates the `tower_sessions.session` table the session store needs.

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use sessioncart_storefront::db;

/// Errors from running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("{0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the connection
/// fails or a migration cannot be applied.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().map_err(MigrationError::MissingEnvVar)?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running catalog migrations...");
    db::migrate(&pool).await?;

    info!("Running session store migrations...");
    PostgresStore::new(pool).migrate().await?;

    info!("Migrations complete!");
    Ok(())
}
