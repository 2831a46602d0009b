//! Per-session request serialization.
//!
//! Every cart request reads the whole cart from the session, changes it and
//! writes the whole cart back. Two overlapping requests for one session would
//! each start from the same cart and the later save would drop the earlier
//! change. This middleware holds a per-session mutex across the inner
//! service, which covers the session layer's load and its end-of-response
//! save, so requests for one session run one after another.
//!
//! Requests without a session cookie are not locked: each one gets a new
//! session that nothing else can see yet.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header::COOKIE,
    middleware::Next,
    response::Response,
};
use moka::sync::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::cookie::Cookie;
use tracing::debug;

use super::session::SESSION_COOKIE_NAME;

/// Locks keyed by session cookie value.
///
/// Entries are evicted after `idle` without access, and eviction does not
/// check whether the mutex is held. A request that holds its session lock
/// for longer than `idle` can therefore let the next request for that
/// session start on a fresh mutex. `idle` must stay well above the longest
/// request; the lock is refreshed on release so the idle clock starts when a
/// request finishes, not when it begins.
#[derive(Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    /// Create a lock table that forgets sessions idle for `idle`.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            locks: Cache::builder().time_to_idle(idle).build(),
        }
    }

    /// Mark `session` as used, restarting its idle clock.
    pub fn touch(&self, session: &str) {
        let _ = self.locks.get(session);
    }

    /// Whether a lock is currently kept for `session`.
    #[must_use]
    pub fn contains(&self, session: &str) -> bool {
        self.locks.contains_key(session)
    }

    /// Wait for exclusive access to `session`.
    pub async fn acquire(&self, session: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(session.to_string(), || Arc::new(Mutex::new(())));

        match Arc::clone(&lock).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Waiting for concurrent request on the same session");
                lock.lock_owned().await
            }
        }
    }
}

impl std::fmt::Debug for SessionLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLocks")
            .field("entries", &self.locks.entry_count())
            .finish()
    }
}

/// Middleware that runs requests for the same session one at a time.
///
/// Must sit outside the session layer.
pub async fn serialize_session_requests(
    State(locks): State<SessionLocks>,
    request: Request,
    next: Next,
) -> Response {
    let Some(session) = session_cookie(&request) else {
        return next.run(request).await;
    };

    let guard = locks.acquire(&session).await;
    let response = next.run(request).await;
    locks.touch(&session);
    drop(guard);

    response
}

/// The session cookie value, if the request carries one.
fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}
