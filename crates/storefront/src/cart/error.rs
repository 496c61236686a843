//! Cart operation errors.

use thiserror::Error;

use rocket_shoes_core::ProductId;

use super::Notice;
use crate::catalog::{CatalogError, StockError};
use crate::storage::StorageError;

/// Which public operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    UpdateAmount,
}

/// Why a cart mutation was not applied.
///
/// These never cross the [`CartStore`](super::CartStore) boundary; they are
/// logged and mapped to a [`Notice`] there.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stock check failed or the quantity is not available.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Product attributes could not be fetched.
    #[error("product lookup failed: {0}")]
    Product(#[source] CatalogError),

    /// The product has no entry in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The requested amount cannot be represented.
    #[error("amount {0} is out of range")]
    AmountOutOfRange(i64),

    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),

    /// The durable store rejected the write.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// The notice reported for this error when it ends `operation`.
    #[must_use]
    pub const fn notice(&self, operation: Operation) -> Notice {
        if matches!(self, Self::Stock(StockError::Exceeded { .. })) {
            return Notice::OutOfStock;
        }
        match operation {
            Operation::Add => Notice::AddFailed,
            Operation::Remove => Notice::RemoveFailed,
            Operation::UpdateAmount => Notice::UpdateFailed,
        }
    }
}
