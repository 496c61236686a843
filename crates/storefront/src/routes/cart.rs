//! Cart route handlers.
//!
//! Handlers are thin: they decode the request, call the [`CartStore`]
//! operation and render the resulting snapshot.
//!
//! [`CartStore`]: crate::cart::CartStore

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rocket_shoes_core::{Cart, CartEntry, Price, ProductId};

use crate::cart::{CartOutcome, Notice, UpdateAmount};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub amount: u32,
    pub price: Price,
    pub price_formatted: String,
    pub subtotal: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Distinct products, as shown on the header badge.
    pub item_count: usize,
    pub total_units: u64,
    pub total: String,
}

/// Notice display data.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    pub code: Notice,
    pub message: &'static str,
}

/// Response to a cart mutation.
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    pub cart: CartView,
    pub notice: Option<NoticeView>,
}

impl From<&CartEntry> for CartItemView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            product_id: entry.product_id,
            name: entry.name.clone(),
            image: entry.image.clone(),
            amount: entry.amount,
            price: entry.price,
            price_formatted: entry.price.display(),
            subtotal: entry.line_total().display(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.entries().iter().map(CartItemView::from).collect(),
            item_count: cart.item_count(),
            total_units: cart.total_units(),
            total: cart.subtotal().display(),
        }
    }
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            code: notice,
            message: notice.message(),
        }
    }
}

impl MutationResponse {
    fn new(state: &AppState, outcome: CartOutcome) -> Self {
        let notice = outcome.notice().map(NoticeView::from);
        let cart = match outcome {
            CartOutcome::Applied(cart) => cart,
            CartOutcome::Ignored | CartOutcome::Rejected(_) => state.cart().snapshot(),
        };
        Self {
            cart: CartView::from(&cart),
            notice,
        }
    }
}

/// Add item request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
}

/// Update amount request body.
#[derive(Debug, Deserialize)]
pub struct UpdateAmountRequest {
    pub amount: i64,
}

fn bad_json(rejection: &JsonRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

fn bad_path(rejection: &PathRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

/// Display the cart, including changes other processes have stored.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from(&state.cart().reload().await))
}

/// Add one unit of a product.
#[instrument(skip(state, body))]
pub async fn add(
    State(state): State<AppState>,
    body: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>> {
    let Json(request) = body.map_err(|e| bad_json(&e))?;
    let outcome = state.cart().add(request.product_id).await;
    Ok(Json(MutationResponse::new(&state, outcome)))
}

/// Set the amount of a cart entry.
#[instrument(skip(state, path, body))]
pub async fn update(
    State(state): State<AppState>,
    path: std::result::Result<Path<ProductId>, PathRejection>,
    body: std::result::Result<Json<UpdateAmountRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>> {
    let Path(product_id) = path.map_err(|e| bad_path(&e))?;
    let Json(request) = body.map_err(|e| bad_json(&e))?;
    let outcome = state
        .cart()
        .update_amount(UpdateAmount {
            product_id,
            amount: request.amount,
        })
        .await;
    Ok(Json(MutationResponse::new(&state, outcome)))
}

/// Remove a cart entry.
#[instrument(skip(state, path))]
pub async fn remove(
    State(state): State<AppState>,
    path: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<MutationResponse>> {
    let Path(product_id) = path.map_err(|e| bad_path(&e))?;
    let outcome = state.cart().remove(product_id).await;
    Ok(Json(MutationResponse::new(&state, outcome)))
}
