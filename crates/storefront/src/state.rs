//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::config::StorefrontConfig;
use crate::middleware::SessionLocks;
use crate::services::{Catalog, SessionCartStorage};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    locks: SessionLocks,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        let locks = SessionLocks::new(config.cart.lock_idle);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                locks,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the per-session lock table.
    #[must_use]
    pub fn locks(&self) -> &SessionLocks {
        &self.inner.locks
    }

    /// Cart storage for the caller's session.
    #[must_use]
    pub fn cart_storage(&self, session: Session) -> SessionCartStorage {
        SessionCartStorage::new(session, self.inner.config.cart.session_key.clone())
    }
}
