//! Session middleware configuration.
//!
//! Sets up cookie sessions using tower-sessions. The store is chosen by the
//! caller: `PostgresStore` in production, `MemoryStore` without a database.

use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cart_session";

/// Session expiry time in seconds (14 days).
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// Over HTTPS the cookie is `Secure` with `SameSite=None`, so a storefront
/// served from another origin can keep its cart. Over plain HTTP it falls
/// back to `SameSite=Lax`, since browsers drop `None` cookies that are not
/// secure.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StorefrontConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    let is_secure = config.is_secure();
    let same_site = if is_secure {
        SameSite::None
    } else {
        SameSite::Lax
    };

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(same_site)
        .with_http_only(true)
        .with_path("/")
}
