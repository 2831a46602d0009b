//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (credentialed requests from configured origins)
//! 5. Cart lock (one request at a time per session)
//! 6. Session layer (tower-sessions with `PostgreSQL` or memory store)

pub mod cart_lock;
pub mod request_id;
pub mod session;

pub use cart_lock::{SessionLocks, serialize_session_requests};
pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
