//! Remote catalog access: stock levels and product attributes.
//!
//! # Endpoints
//!
//! ```text
//! GET {base}/stock/{id}     -> {"id": 1, "amount": 3}
//! GET {base}/products/{id}  -> {"id": 1, "title": "...", "price": 179.9, "image": "..."}
//! ```
//!
//! Stock is fetched fresh for every validating cart operation. Product
//! attributes are cached by [`CatalogClient`] since they are only needed the
//! first time a product enters the cart.

mod client;
mod validator;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use rocket_shoes_core::{Product, ProductId, StockRecord};

pub use client::CatalogClient;
pub use validator::{StockError, StockValidator};

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The lookup did not complete in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Read-only access to the remote catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Current stock for a product.
    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError>;

    /// Full catalog attributes for a product.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;
}

/// Run a catalog lookup, failing with `CatalogError::Timeout` if it does not
/// resolve within `limit`.
///
/// # Errors
///
/// Returns the lookup's own error, or `CatalogError::Timeout`.
pub async fn with_timeout<T, F>(limit: Duration, lookup: F) -> Result<T, CatalogError>
where
    F: Future<Output = Result<T, CatalogError>>,
{
    tokio::time::timeout(limit, lookup)
        .await
        .map_err(|_| CatalogError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("stock/9".to_string());
        assert_eq!(err.to_string(), "Not found: stock/9");

        let err = CatalogError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through_result() {
        let ok = with_timeout(Duration::from_secs(1), async { Ok::<_, CatalogError>(3) }).await;
        assert!(matches!(ok, Ok(3)));

        let err = with_timeout(Duration::from_secs(1), async {
            Err::<u32, _>(CatalogError::NotFound("x".to_string()))
        })
        .await;
        assert!(matches!(err, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(50),
            std::future::pending::<Result<u32, CatalogError>>(),
        )
        .await;
        assert!(matches!(result, Err(CatalogError::Timeout(_))));
    }
}
