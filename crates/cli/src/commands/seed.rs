//! Seed the product catalog from a YAML file.
//!
//! # File Format
//!
//! ```yaml
//! - title: Dish soap
//!   price: "2.50"
//!   description: Lemon scented, 500ml
//! - title: Sponge
//!   price: "0.99"
//!   is_available: false
//! ```
//!
//! The whole file is validated before anything is written, and the clear and
//! the inserts run in one transaction: a failed seed leaves the catalog as it
//! was.

use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use sessioncart_core::{MAX_TITLE_LENGTH, Price, ProductId};
use sessioncart_storefront::db::{self, NewProduct, ProductWriter, RepositoryError};

/// One product entry in the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductEntry {
    pub title: String,
    pub price: Price,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub description: String,
}

const fn default_available() -> bool {
    true
}

impl From<ProductEntry> for NewProduct {
    fn from(entry: ProductEntry) -> Self {
        Self {
            title: entry.title.trim().to_string(),
            full_description: entry.description,
            price: entry.price,
            is_available: entry.is_available,
        }
    }
}

/// Check every entry, returning one message per problem.
#[must_use]
pub fn validate_products(entries: &[ProductEntry]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let position = index + 1;
        let title = entry.title.trim();

        if title.is_empty() {
            errors.push(format!("product #{position}: title is empty"));
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.push(format!(
                "product #{position} ({title}): title is longer than {MAX_TITLE_LENGTH} characters"
            ));
        }

        if let Err(e) = entry.price.check() {
            errors.push(format!("product #{position} ({title}): price {e}"));
        }
    }

    errors
}

/// Insert `products`, optionally replacing the whole catalog, atomically.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails; nothing is
/// committed in that case.
pub async fn seed_products(
    pool: &PgPool,
    products: &[NewProduct],
    clear_existing: bool,
) -> Result<Vec<ProductId>, RepositoryError> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(products.len());

    {
        let mut writer = ProductWriter::new(&mut tx);

        if clear_existing {
            let removed = writer.delete_all().await?;
            info!(removed, "Cleared existing products");
        }

        for product in products {
            let id = writer.insert(product).await?;
            info!(product_id = %id, title = %product.title, "Inserted product");
            ids.push(id);
        }
    }

    tx.commit().await?;
    Ok(ids)
}

/// Seed catalog products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML file
/// * `clear_existing` - If true, delete every existing product first
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or fails validation, or database operations fail.
pub async fn products(
    file_path: &str,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let entries: Vec<ProductEntry> = serde_yaml::from_str(&content)?;

    info!(products = entries.len(), "Parsed file");

    let errors = validate_products(&entries);
    if !errors.is_empty() {
        error!("Product validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let products: Vec<NewProduct> = entries.into_iter().map(NewProduct::from).collect();
    let ids = seed_products(&pool, &products, clear_existing).await?;

    info!(inserted = ids.len(), "Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Vec<ProductEntry> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let entries = parse("- title: Dish soap\n  price: \"2.50\"\n");

        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_available);
        assert!(entries[0].description.is_empty());
        assert_eq!(entries[0].price, Price::from_cents(250));
    }

    #[test]
    fn test_valid_products_pass() {
        let entries = parse(
            "- title: Dish soap\n  price: \"2.50\"\n- title: Sponge\n  price: \"0.99\"\n  is_available: false\n",
        );

        assert!(validate_products(&entries).is_empty());
    }

    #[test]
    fn test_blank_title_rejected() {
        let entries = parse("- title: \"  \"\n  price: \"1.00\"\n");

        let errors = validate_products(&entries);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("title is empty"));
    }

    #[test]
    fn test_bad_price_rejected() {
        let entries = parse(
            "- title: Negative\n  price: \"-1.00\"\n- title: Fractional\n  price: \"1.005\"\n",
        );

        assert_eq!(validate_products(&entries).len(), 2);
    }

    #[test]
    fn test_entry_title_trimmed_on_insert() {
        let entry = parse("- title: \" Sponge \"\n  price: \"0.99\"\n").remove(0);

        assert_eq!(NewProduct::from(entry).title, "Sponge");
    }

    fn new_product(title: &str, cents: i64) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            full_description: String::new(),
            price: Price::from_cents(cents),
            is_available: true,
        }
    }

    #[tokio::test]
    #[ignore = "needs a disposable PostgreSQL database in CART_DATABASE_URL"]
    async fn test_failed_seed_with_clear_keeps_existing_catalog() {
        use sessioncart_storefront::db::ProductRepository;

        let pool = db::create_pool(&super::super::database_url().unwrap())
            .await
            .unwrap();
        db::migrate(&pool).await.unwrap();

        let kept = seed_products(&pool, &[new_product("Kept", 100)], true)
            .await
            .unwrap();

        // Longer than the VARCHAR(255) column, so the second insert fails.
        let too_long = new_product(&"x".repeat(300), 200);
        let result = seed_products(&pool, &[new_product("New", 200), too_long], true).await;

        assert!(result.is_err());
        let repo = ProductRepository::new(&pool);
        assert!(repo.get_by_id(kept[0]).await.unwrap().is_some());
    }
}
