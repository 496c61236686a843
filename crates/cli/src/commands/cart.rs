//! Cart management commands.
//!
//! # Usage
//!
//! ```bash
//! rs-cli cart show
//! rs-cli cart add 1
//! rs-cli cart update 1 3
//! rs-cli cart remove 1
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATA_DIR` - Directory holding the persisted cart
//! - `CATALOG_API_URL` - Stock and product API used to validate changes

use rocket_shoes_core::{Cart, ProductId};
use rocket_shoes_storefront::cart::{CartOutcome, CartStore, Notice, UpdateAmount};
use rocket_shoes_storefront::config::StorefrontConfig;
use rocket_shoes_storefront::error::AppError;
use rocket_shoes_storefront::state;
use thiserror::Error;

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// The cart could not be opened.
    #[error(transparent)]
    Setup(#[from] AppError),

    /// The operation was rejected; the cart is unchanged.
    #[error("{0}")]
    Rejected(Notice),
}

async fn open() -> Result<CartStore, CartCommandError> {
    let config = StorefrontConfig::from_env().map_err(AppError::from)?;
    Ok(state::open_cart(&config).await?)
}

/// Print the cart.
pub async fn show() -> Result<(), CartCommandError> {
    print_cart(&open().await?.snapshot());
    Ok(())
}

/// Add one unit of a product.
pub async fn add(product_id: ProductId) -> Result<(), CartCommandError> {
    let cart = open().await?;
    report(cart.add(product_id).await)
}

/// Remove a product.
pub async fn remove(product_id: ProductId) -> Result<(), CartCommandError> {
    let cart = open().await?;
    report(cart.remove(product_id).await)
}

/// Set a product's amount.
pub async fn update(product_id: ProductId, amount: i64) -> Result<(), CartCommandError> {
    let cart = open().await?;
    report(
        cart.update_amount(UpdateAmount { product_id, amount })
            .await,
    )
}

fn report(outcome: CartOutcome) -> Result<(), CartCommandError> {
    match outcome {
        CartOutcome::Applied(cart) => {
            print_cart(&cart);
            Ok(())
        }
        CartOutcome::Ignored => {
            tracing::info!("Nothing to do: amount must be at least 1");
            Ok(())
        }
        CartOutcome::Rejected(notice) => Err(CartCommandError::Rejected(notice)),
    }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for entry in cart.entries() {
        tracing::info!(
            "#{} {} x{} @ {} = {}",
            entry.product_id,
            entry.name,
            entry.amount,
            entry.price,
            entry.line_total()
        );
    }
    tracing::info!(
        "{} products, {} units, total {}",
        cart.item_count(),
        cart.total_units(),
        cart.subtotal()
    );
}
