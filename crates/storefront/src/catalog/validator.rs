//! Stock validation gating cart mutations.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument};

use rocket_shoes_core::ProductId;

use super::{CatalogApi, CatalogError, with_timeout};

/// Why a requested quantity was not admitted.
#[derive(Debug, Error)]
pub enum StockError {
    /// Stock could not be determined (network, not found, timeout).
    #[error("stock lookup failed: {0}")]
    Lookup(#[from] CatalogError),

    /// The requested quantity is above what is available.
    #[error("requested {requested} of product {product_id}, only {available} in stock")]
    Exceeded {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },
}

/// Decides whether a quantity of a product can be held in the cart.
///
/// Every call performs exactly one stock lookup, bounded by `timeout`. There
/// is no retry and no caching.
#[derive(Clone)]
pub struct StockValidator {
    catalog: Arc<dyn CatalogApi>,
    timeout: Duration,
}

impl StockValidator {
    /// Create a validator over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogApi>, timeout: Duration) -> Self {
        Self { catalog, timeout }
    }

    /// The catalog this validator queries.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogApi> {
        &self.catalog
    }

    /// Lookup timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the units currently available for a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the lookup fails or times out, or
    /// `CatalogError::Parse` if the record is for a different product.
    pub async fn available(&self, product_id: ProductId) -> Result<u32, CatalogError> {
        let record = with_timeout(self.timeout, self.catalog.stock(product_id)).await?;
        if record.id != product_id {
            return Err(CatalogError::Parse(format!(
                "requested stock for {product_id}, catalog returned {}",
                record.id
            )));
        }
        Ok(record.amount)
    }

    /// Check that `requested` units of a product are in stock.
    ///
    /// Returns the available amount on success.
    ///
    /// # Errors
    ///
    /// Returns `StockError::Lookup` if stock could not be fetched, or
    /// `StockError::Exceeded` if `requested` is above the available amount.
    #[instrument(skip(self), fields(available))]
    pub async fn admit(&self, product_id: ProductId, requested: u64) -> Result<u32, StockError> {
        let available = self.available(product_id).await?;
        tracing::Span::current().record("available", available);

        if requested > u64::from(available) {
            return Err(StockError::Exceeded {
                product_id,
                requested,
                available,
            });
        }

        debug!("quantity admitted");
        Ok(available)
    }
}
