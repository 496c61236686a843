//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Health check
//!
//! # Cart (JSON)
//! GET    /cart                     - Cart snapshot
//! POST   /cart/items               - Add one unit     {"productId": 1}
//! PATCH  /cart/items/{product_id}  - Set amount       {"amount": 3}
//! DELETE /cart/items/{product_id}  - Remove entry
//! ```
//!
//! Cart mutations always answer `200 OK` with the resulting cart and an
//! optional notice; a rejected operation is not an HTTP error.

pub mod cart;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the full application router (without state).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/cart", cart_routes())
        .fallback(not_found)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            axum::routing::patch(cart::update).delete(cart::remove),
        )
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
