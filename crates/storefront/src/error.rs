//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; every error body is JSON of the form
//! `{"detail": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use sessioncart_core::{CartError, ValidationError};

use crate::db::RepositoryError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Session record could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::Validation(_) => StatusCode::BAD_REQUEST,
                CartError::ProductNotFound(_) | CartError::ItemNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CartError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Session(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The `detail` value sent to the client.
    ///
    /// Validation errors are keyed by the offending field; everything else is
    /// a plain message. Internal details are never exposed.
    #[must_use]
    pub fn detail(&self) -> Value {
        match self {
            Self::Cart(CartError::Validation(err)) => validation_detail(err),
            Self::Cart(CartError::ProductNotFound(_)) => json!("Product not found."),
            Self::Cart(CartError::ItemNotFound(_)) => json!("Cart item not found"),
            Self::Cart(CartError::Storage(_))
            | Self::Session(_)
            | Self::Database(_)
            | Self::Internal(_) => json!("Internal server error"),
            Self::NotFound(msg) | Self::BadRequest(msg) => json!(msg),
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

/// Field-keyed detail for a validation error.
fn validation_detail(err: &ValidationError) -> Value {
    match err {
        ValidationError::MissingProduct => json!({ "product": ["This field is required."] }),
        ValidationError::InvalidCount(_) => {
            json!({ "count": ["Ensure this value is greater than or equal to 1."] })
        }
        ValidationError::MalformedItem(reason) => json!({ "item": [reason] }),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for cart actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb
                .data
                .insert((*key).to_string(), Value::String((*value).to_string()));
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
