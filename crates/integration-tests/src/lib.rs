//! Integration test harness for Session Cart.
//!
//! Drives the real storefront router in process, with in-memory sessions and
//! an in-memory catalog, so no database or server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sessioncart-integration-tests
//! ```

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use sessioncart_core::{InMemoryCatalog, Price, ProductId, ProductSnapshot};
use sessioncart_storefront::build_router;
use sessioncart_storefront::config::StorefrontConfig;
use sessioncart_storefront::middleware::SESSION_COOKIE_NAME;
use sessioncart_storefront::services::Catalog;
use sessioncart_storefront::state::AppState;

/// Response status and JSON body (`Value::Null` when the body is empty).
pub type TestResponse = (StatusCode, Value);

/// Catalog used by the tests: products 1..=7 titled "A".."G", each priced
/// at `id * 5.00`.
#[must_use]
pub fn test_catalog() -> InMemoryCatalog {
    ('A'..='G').zip(1..).fold(InMemoryCatalog::new(), |catalog, (title, id)| {
        catalog.with_product(
            ProductId::new(id),
            ProductSnapshot::new(title.to_string(), Price::from_cents(i64::from(id) * 500)),
        )
    })
}

/// One client talking to a fresh in-process storefront.
///
/// Keeps the session cookie between requests the way a browser would.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// A client for a new app with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorefrontConfig::in_memory())
    }

    /// A client for a new app with `config`.
    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        let catalog = Catalog::in_memory(test_catalog(), Duration::from_secs(60));
        let state = AppState::new(config, catalog);

        Self {
            router: build_router(state, MemoryStore::default()),
            cookie: None,
        }
    }

    /// Another client on the same app, without this client's session.
    #[must_use]
    pub fn stranger(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Another client on the same app, holding this client's session cookie.
    ///
    /// Lets a test send overlapping requests for one session.
    #[must_use]
    pub fn same_session(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: self.cookie.clone(),
        }
    }

    /// The session cookie this client is holding, if any.
    #[must_use]
    pub fn session_cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Send a request and return its status and JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }

        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };

        (status, json)
    }

    /// `GET /cart`.
    pub async fn list(&mut self) -> TestResponse {
        self.send(Method::GET, "/cart", None).await
    }

    /// `GET /cart?page={page}`.
    pub async fn list_page(&mut self, page: &str) -> TestResponse {
        self.send(Method::GET, &format!("/cart?page={page}"), None)
            .await
    }

    /// `POST /cart/add` with `{"product": product, "count": count}`.
    pub async fn add(&mut self, product: i32, count: Option<i64>) -> TestResponse {
        let body = count.map_or_else(
            || serde_json::json!({ "product": product }),
            |count| serde_json::json!({ "product": product, "count": count }),
        );
        self.send(Method::POST, "/cart/add", Some(&body.to_string()))
            .await
    }

    /// `DELETE /cart/remove/{id}`.
    pub async fn remove(&mut self, id: i32) -> TestResponse {
        self.send(Method::DELETE, &format!("/cart/remove/{id}"), None)
            .await
    }

    /// `PATCH /cart/increase/{id}`.
    pub async fn increase(&mut self, id: i32) -> TestResponse {
        self.send(Method::PATCH, &format!("/cart/increase/{id}"), None)
            .await
    }

    /// `PATCH /cart/decrease/{id}`.
    pub async fn decrease(&mut self, id: i32) -> TestResponse {
        self.send(Method::PATCH, &format!("/cart/decrease/{id}"), None)
            .await
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
