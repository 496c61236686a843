//! The cart consistency engine.
//!
//! [`CartStore`] is the single owner of the cart. It exposes a synchronous
//! snapshot and three mutating operations: [`add`](CartStore::add),
//! [`remove`](CartStore::remove) and [`update_amount`](CartStore::update_amount).
//!
//! # Consistency
//!
//! - One mutation is in flight at a time: each operation holds the mutation
//!   gate across its stock lookup, its product lookup and its write.
//! - Other processes may share the durable store. Each mutation also holds
//!   the store's lock on [`CART_KEY`] and starts from a fresh read of the
//!   stored cart, so a write made elsewhere is never overwritten unseen.
//! - A candidate cart is persisted first and only then committed to memory,
//!   so after every operation the in-memory and durable copies are equal.
//! - Failures are logged with their cause, reported once to the
//!   [`Notifier`] and returned as [`CartOutcome::Rejected`]; they are never
//!   raised to the caller.

mod error;
mod notice;

use std::num::NonZeroU32;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use rocket_shoes_core::{Cart, ProductId};

use crate::catalog::{CatalogError, StockValidator, with_timeout};
use crate::storage::{CART_KEY, KeyLock, KeyValueStore};

pub use error::{CartError, Operation};
pub use notice::{LogNotifier, Notice, Notifier, RecordingNotifier};

/// Request to set the amount of a cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAmount {
    pub product_id: ProductId,
    /// Target absolute amount. Values of zero or below are ignored.
    pub amount: i64,
}

/// Result of a cart operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOutcome {
    /// The mutation was persisted and committed; holds the new cart.
    Applied(Cart),
    /// The request was a no-op and nothing was reported.
    Ignored,
    /// The cart is unchanged and the notice was sent to the user.
    Rejected(Notice),
}

impl CartOutcome {
    /// Whether the cart changed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The reported notice, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<Notice> {
        match self {
            Self::Rejected(notice) => Some(*notice),
            _ => None,
        }
    }
}

/// Owner of the user's cart.
pub struct CartStore {
    committed: RwLock<Cart>,
    gate: Mutex<()>,
    validator: StockValidator,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Open the cart, seeding it from the durable store.
    ///
    /// A missing payload yields an empty cart. An unreadable or corrupt
    /// payload is logged and also yields an empty cart; it is left in place
    /// until the next successful mutation overwrites it.
    pub async fn open(
        validator: StockValidator,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cart = load(store.as_ref()).await;
        Self {
            committed: RwLock::new(cart),
            gate: Mutex::new(()),
            validator,
            store,
            notifier,
        }
    }

    /// The current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented if stock allows; a new
    /// product is fetched from the catalog and added with amount 1.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId) -> CartOutcome {
        let _gate = self.gate.lock().await;
        let result = self.try_add(product_id).await;
        self.finish(Operation::Add, result)
    }

    /// Remove a product's entry.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> CartOutcome {
        let _gate = self.gate.lock().await;
        let result = self.try_remove(product_id).await;
        self.finish(Operation::Remove, result)
    }

    /// Set a product's amount to an exact value.
    ///
    /// Amounts of zero or below are ignored without a notice; removal is
    /// [`remove`](Self::remove)'s job.
    #[instrument(skip(self))]
    pub async fn update_amount(&self, request: UpdateAmount) -> CartOutcome {
        if request.amount <= 0 {
            debug!("ignoring non-positive amount");
            return CartOutcome::Ignored;
        }
        let _gate = self.gate.lock().await;
        let result = self.try_update_amount(request).await;
        self.finish(Operation::UpdateAmount, result)
    }

    /// Re-read the durable cart and return it.
    ///
    /// Picks up changes made by other processes sharing the store. If the
    /// store cannot be read, the last known cart is returned.
    pub async fn reload(&self) -> Cart {
        let _gate = self.gate.lock().await;
        match self.begin().await {
            Ok((_lock, cart)) => cart,
            Err(e) => {
                warn!(error = %e, "could not reload persisted cart");
                self.snapshot()
            }
        }
    }

    /// Lock the stored cart and adopt its current value as the committed one.
    async fn begin(&self) -> Result<(KeyLock, Cart), CartError> {
        let lock = self.store.lock(CART_KEY).await?;
        let cart = self
            .store
            .get(CART_KEY)
            .await?
            .map_or_else(Cart::new, |payload| decode_or_empty(&payload));

        if cart != self.snapshot() {
            debug!(entries = cart.len(), "stored cart changed elsewhere");
        }
        self.replace(cart.clone());
        Ok((lock, cart))
    }

    async fn try_add(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let (_lock, cart) = self.begin().await?;
        let current = cart.find(product_id).map_or(0, |entry| entry.amount);

        self.validator
            .admit(product_id, u64::from(current) + 1)
            .await?;

        let next = match cart.with_incremented(product_id) {
            Some(next) => next,
            None => {
                let product = with_timeout(
                    self.validator.timeout(),
                    self.validator.catalog().product(product_id),
                )
                .await
                .map_err(CartError::Product)?;

                if product.id != product_id {
                    return Err(CartError::Product(CatalogError::Parse(format!(
                        "requested product {product_id}, catalog returned {}",
                        product.id
                    ))));
                }
                cart.with_product(&product)
            }
        };

        self.commit(next).await
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let (_lock, cart) = self.begin().await?;
        let next = cart
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        self.commit(next).await
    }

    async fn try_update_amount(&self, request: UpdateAmount) -> Result<Cart, CartError> {
        let UpdateAmount { product_id, amount } = request;
        let requested =
            u64::try_from(amount).map_err(|_| CartError::AmountOutOfRange(amount))?;

        let (_lock, cart) = self.begin().await?;
        self.validator.admit(product_id, requested).await?;

        let amount = u32::try_from(amount)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(CartError::AmountOutOfRange(amount))?;
        let next = cart
            .with_amount(product_id, amount)
            .ok_or(CartError::NotInCart(product_id))?;
        self.commit(next).await
    }

    /// Persist `next`, then make it the committed cart.
    ///
    /// Callers hold the lock taken by [`begin`](Self::begin).
    async fn commit(&self, next: Cart) -> Result<Cart, CartError> {
        let payload = next.encode()?;
        self.store.set(CART_KEY, &payload).await?;
        self.replace(next.clone());
        Ok(next)
    }

    fn replace(&self, cart: Cart) {
        *self
            .committed
            .write()
            .unwrap_or_else(PoisonError::into_inner) = cart;
    }

    fn finish(&self, operation: Operation, result: Result<Cart, CartError>) -> CartOutcome {
        match result {
            Ok(cart) => {
                info!(
                    entries = cart.len(),
                    units = cart.total_units(),
                    "cart updated"
                );
                CartOutcome::Applied(cart)
            }
            Err(err) => {
                let notice = err.notice(operation);
                warn!(error = %err, ?operation, ?notice, "cart operation rejected");
                self.notifier.notify(notice);
                CartOutcome::Rejected(notice)
            }
        }
    }
}

/// Read the persisted cart, falling back to empty.
async fn load(store: &dyn KeyValueStore) -> Cart {
    match store.get(CART_KEY).await {
        Ok(None) => {
            debug!("no persisted cart, starting empty");
            Cart::new()
        }
        Ok(Some(payload)) => {
            let cart = decode_or_empty(&payload);
            info!(entries = cart.len(), "restored persisted cart");
            cart
        }
        Err(e) => {
            warn!(error = %e, "could not read persisted cart, starting empty");
            Cart::new()
        }
    }
}

/// Decode a stored cart, treating a corrupt payload as empty.
fn decode_or_empty(payload: &str) -> Cart {
    Cart::decode(payload).unwrap_or_else(|e| {
        warn!(error = %e, "corrupt persisted cart, using empty cart");
        Cart::new()
    })
}
