//! Cart route handlers.
//!
//! The cart lives in the caller's session. Every handler loads it into a
//! [`CartManager`], applies one operation and commits only on success, so a
//! failed request leaves the stored cart as it was.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, instrument};

use sessioncart_core::{CartLineItem, LineItemId, Price};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::cart::{AddItemRequest, CartManager};
use crate::state::AppState;

const INVALID_PAGE: &str = "Invalid page.";

/// Product fields shown for a cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartProductView {
    pub title: String,
    pub price: Price,
}

/// One cart item as returned by `GET /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub id: LineItemId,
    pub product: CartProductView,
    pub count: i64,
    pub total_price: Price,
}

impl TryFrom<&CartLineItem> for CartItemView {
    type Error = AppError;

    fn try_from(item: &CartLineItem) -> std::result::Result<Self, Self::Error> {
        let total_price = item.total_price().ok_or_else(|| {
            AppError::Internal(format!("total price of cart item {} overflows", item.id))
        })?;

        Ok(Self {
            id: item.id,
            product: CartProductView {
                title: item.product.title.clone(),
                price: item.product.price,
            },
            count: item.count,
            total_price,
        })
    }
}

/// Query parameters for listing the cart.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-based page; the whole cart when absent.
    pub page: Option<usize>,
}

/// Slice out one page of `items`.
///
/// Page 1 always exists, even for an empty cart.
fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Option<&[T]> {
    if page == 0 || page_size == 0 {
        return None;
    }

    let start = (page - 1).checked_mul(page_size)?;
    if page > 1 && start >= items.len() {
        return None;
    }

    let end = start.saturating_add(page_size).min(items.len());
    items.get(start.min(end)..end)
}

fn detail(message: &str) -> Json<serde_json::Value> {
    Json(json!({ "detail": message }))
}

/// List the cart.
///
/// Pagination is opt-in: without `?page` every item is returned. This
/// differs from the earlier service, which always paginated and so returned
/// only the first `CART_PAGE_SIZE` items by default.
#[instrument(skip(state, session, query))]
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<CartItemView>>> {
    let Query(query) = query.map_err(|_| AppError::NotFound(INVALID_PAGE.to_string()))?;

    // Read-only: the manager is dropped without committing.
    let manager = CartManager::load(state.cart_storage(session)).await?;
    let items = manager.items();

    let page = match query.page {
        Some(page) => paginate(items, page, state.config().cart.page_size)
            .ok_or_else(|| AppError::NotFound(INVALID_PAGE.to_string()))?,
        None => items,
    };

    let views = page
        .iter()
        .map(CartItemView::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(views))
}

/// Add a product to the cart.
#[instrument(skip(state, session, payload))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let mut manager = CartManager::load(state.cart_storage(session)).await?;
    let outcome = manager.add_to_cart(&request, state.catalog()).await?;
    manager.commit().await?;

    let item_id = outcome.item_id().to_string();
    add_breadcrumb("cart", "Added item", Some(&[("item_id", item_id.as_str())]));
    info!(item_id = %item_id, ?outcome, "Item added to cart");

    Ok((
        StatusCode::CREATED,
        detail("Successfully added item to the cart."),
    ))
}

/// Remove an item from the cart. Succeeds whether or not the item exists.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<LineItemId>,
) -> Result<StatusCode> {
    let mut manager = CartManager::load(state.cart_storage(session)).await?;
    manager.remove_from_cart(id);
    manager.commit().await?;

    add_breadcrumb(
        "cart",
        "Removed item",
        Some(&[("item_id", id.to_string().as_str())]),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Increase an item's count by one.
#[instrument(skip(state, session))]
pub async fn increase(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<LineItemId>,
) -> Result<impl IntoResponse> {
    change_count(&state, session, id, 1).await?;
    Ok(detail("Item count increased."))
}

/// Decrease an item's count by one, removing it at zero.
#[instrument(skip(state, session))]
pub async fn decrease(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<LineItemId>,
) -> Result<impl IntoResponse> {
    change_count(&state, session, id, -1).await?;
    Ok(detail("Item count decreased."))
}

async fn change_count(state: &AppState, session: Session, id: LineItemId, delta: i64) -> Result<()> {
    let mut manager = CartManager::load(state.cart_storage(session)).await?;
    let outcome = manager.update_quantity(id, delta)?;
    manager.commit().await?;

    add_breadcrumb(
        "cart",
        "Changed item count",
        Some(&[
            ("item_id", id.to_string().as_str()),
            ("delta", delta.to_string().as_str()),
        ]),
    );
    info!(item_id = %id, delta, ?outcome, "Cart item count changed");
    Ok(())
}
