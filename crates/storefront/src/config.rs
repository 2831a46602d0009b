//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`). Without it, sessions and the catalog live in memory.
//! - `CART_HOST` - Bind address (default: 127.0.0.1)
//! - `CART_PORT` - Listen port (default: 8000)
//! - `CART_BASE_URL` - Public URL, decides secure cookies (default: <http://localhost:8000>)
//! - `CART_SESSION_KEY` - Key the cart is stored under in the session (default: cart)
//! - `CART_PAGE_SIZE` - Items per page for `GET /cart?page=N` (default: 5)
//! - `CART_PRODUCT_CACHE_TTL_SECS` - Product lookup cache TTL (default: 60)
//! - `CART_LOCK_IDLE_SECS` - Idle time before a session lock is evicted (default: 300)
//! - `CART_CORS_ORIGINS` - Comma-separated origins allowed to call the API with credentials
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Cart settings
    pub cart: CartConfig,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_origins: Vec<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
}

/// Settings for the cart engine and its HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the cart list is stored under in the session record
    pub session_key: String,
    /// Items per page when a page is requested
    pub page_size: usize,
    /// How long resolved products stay cached
    pub product_cache_ttl: Duration,
    /// How long an unused per-session lock is kept
    pub lock_idle: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            session_key: "cart".to_string(),
            page_size: 5,
            product_cache_ttl: Duration::from_secs(60),
            lock_idle: Duration::from_secs(300),
        }
    }
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("cart", &self.cart)
            .field("cors_origins", &self.cors_origins)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed or is
    /// out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CART_DATABASE_URL");
        let host = parse_env("CART_HOST", "127.0.0.1")?;
        let port = parse_env("CART_PORT", "8000")?;
        let base_url = get_env_or_default("CART_BASE_URL", "http://localhost:8000");

        let cart = CartConfig::from_env()?;
        let cors_origins = get_optional_env("CART_CORS_ORIGINS")
            .map(|value| parse_origins(&value))
            .unwrap_or_default();

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cart,
            cors_origins,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            json_logs: get_optional_env("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    /// Configuration for running in memory on the default port.
    ///
    /// Used by tests and as the base for hand-built configurations.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            cart: CartConfig::default(),
            cors_origins: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
            json_logs: false,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CartConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let session_key = get_env_or_default("CART_SESSION_KEY", "cart");
        if session_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_SESSION_KEY".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        let page_size: usize = parse_env("CART_PAGE_SIZE", "5")?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let cache_ttl_secs: u64 = parse_env("CART_PRODUCT_CACHE_TTL_SECS", "60")?;
        let lock_idle_secs: u64 = parse_env("CART_LOCK_IDLE_SECS", "300")?;

        Ok(Self {
            session_key,
            page_size,
            product_cache_ttl: Duration::from_secs(cache_ttl_secs),
            lock_idle: Duration::from_secs(lock_idle_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect()
}
