//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::{CartStore, LogNotifier};
use crate::catalog::{CatalogClient, StockValidator};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::storage::FileStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the cart.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cart: Arc<CartStore>,
}

impl AppState {
    /// Create a new application state around an opened cart.
    #[must_use]
    pub fn new(cart: Arc<CartStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cart }),
        }
    }

    /// Get a reference to the cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }
}

/// Open the cart described by `config`: HTTP catalog, on-disk store and
/// log notifier.
///
/// # Errors
///
/// Returns an error if the catalog client cannot be built or the data
/// directory cannot be created.
pub async fn open_cart(config: &StorefrontConfig) -> Result<CartStore, AppError> {
    let catalog = CatalogClient::new(&config.catalog)?;
    let store = FileStore::open(&config.data_dir).await?;
    tracing::info!(dir = %store.dir().display(), "cart store opened");

    let validator = StockValidator::new(Arc::new(catalog), config.catalog.timeout);
    Ok(CartStore::open(validator, Arc::new(store), Arc::new(LogNotifier)).await)
}
