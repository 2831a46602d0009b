//! CLI subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Database URL from `CART_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error message if neither variable is set.
pub fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    std::env::var("CART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "CART_DATABASE_URL not set")
}
