//! Integration tests for Rocket Shoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-shoes-integration-tests
//! ```
//!
//! No external services are needed: the catalog is either a [`FakeCatalog`]
//! behind the `CatalogApi` trait or an in-process axum server started with
//! [`spawn_catalog_server`].
//!
//! # Test Categories
//!
//! - `cart_consistency` - Operation semantics and durable/in-memory agreement
//! - `cart_concurrency` - Overlapping mutations on one cart
//! - `catalog_client` - HTTP catalog client against a local server
//! - `cart_routes` - JSON API
//! - `file_store_restart` - Cart restored from the on-disk store
//! - `shared_store` - Two carts writing one data directory

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};

use rocket_shoes_core::{Cart, Price, Product, ProductId, StockRecord};
use rocket_shoes_storefront::cart::{CartStore, RecordingNotifier};
use rocket_shoes_storefront::catalog::{CatalogApi, CatalogError, StockValidator};
use rocket_shoes_storefront::storage::{CART_KEY, KeyValueStore, MemoryStore};

/// Build a catalog product with predictable attributes.
#[must_use]
pub fn product(id: i32) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Rocket Shoe {id}"),
        price: Price::from_cents(10_000 + i64::from(id) * 990),
        image: format!("https://cdn.example.com/shoes/{id}.jpg"),
    }
}

/// An in-memory catalog with adjustable stock.
#[derive(Default)]
pub struct FakeCatalog {
    stock: Mutex<HashMap<ProductId, u32>>,
    products: Mutex<HashMap<ProductId, Product>>,
    latency: Option<Duration>,
    stock_calls: AtomicUsize,
    product_calls: AtomicUsize,
}

impl FakeCatalog {
    /// A catalog where every listed product exists with the given stock.
    #[must_use]
    pub fn with_stock(pairs: &[(i32, u32)]) -> Self {
        let catalog = Self::default();
        for &(id, amount) in pairs {
            catalog.set_stock(id, amount);
            catalog.add_product(product(id));
        }
        catalog
    }

    /// Delay every lookup, yielding to other tasks while waiting.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_stock(&self, id: i32, amount: u32) {
        self.stock
            .lock()
            .unwrap()
            .insert(ProductId::new(id), amount);
    }

    pub fn remove_stock(&self, id: i32) {
        self.stock.lock().unwrap().remove(&ProductId::new(id));
    }

    pub fn add_product(&self, product: Product) {
        self.products.lock().unwrap().insert(product.id, product);
    }

    /// Answer lookups for `id` with `product`, whatever its own id.
    pub fn add_product_as(&self, id: i32, product: Product) {
        self.products
            .lock()
            .unwrap()
            .insert(ProductId::new(id), product);
    }

    pub fn remove_product(&self, id: i32) {
        self.products.lock().unwrap().remove(&ProductId::new(id));
    }

    #[must_use]
    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        let amount = self.stock.lock().unwrap().get(&id).copied();
        amount
            .map(|amount| StockRecord { id, amount })
            .ok_or_else(|| CatalogError::NotFound(format!("stock/{id}")))
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        let product = self.products.lock().unwrap().get(&id).cloned();
        product.ok_or_else(|| CatalogError::NotFound(format!("products/{id}")))
    }
}

/// A cart wired to test doubles.
pub struct TestCart {
    pub cart: Arc<CartStore>,
    pub catalog: Arc<FakeCatalog>,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestCart {
    /// Open a cart over `catalog`, seeded with `initial` in the store.
    pub async fn open(catalog: FakeCatalog, initial: Option<&Cart>) -> Self {
        let store = Arc::new(match initial {
            Some(cart) => MemoryStore::with_value(CART_KEY, &cart.encode().unwrap()),
            None => MemoryStore::new(),
        });
        Self::open_with_store(catalog, store).await
    }

    /// Open a cart over `catalog` and an existing store.
    pub async fn open_with_store(catalog: FakeCatalog, store: Arc<MemoryStore>) -> Self {
        let catalog = Arc::new(catalog);
        let notifier = Arc::new(RecordingNotifier::new());
        let validator = StockValidator::new(catalog.clone(), Duration::from_secs(2));
        let cart = CartStore::open(validator, store.clone(), notifier.clone()).await;
        Self {
            cart: Arc::new(cart),
            catalog,
            store,
            notifier,
        }
    }

    /// The cart as currently persisted.
    pub async fn persisted(&self) -> Cart {
        let payload = self.store.get(CART_KEY).await.unwrap().unwrap();
        Cart::decode(&payload).unwrap()
    }

    /// Assert the in-memory and persisted carts are equal, returning the cart.
    pub async fn assert_in_sync(&self) -> Cart {
        let snapshot = self.cart.snapshot();
        assert_eq!(self.persisted().await, snapshot, "memory and store diverged");
        snapshot
    }
}

/// Build a cart from `(product id, amount)` pairs using [`product`] data.
#[must_use]
pub fn cart_of(entries: &[(i32, u32)]) -> Cart {
    let entries = entries
        .iter()
        .map(|&(id, amount)| {
            let mut entry = rocket_shoes_core::CartEntry::from_product(&product(id));
            entry.amount = amount;
            entry
        })
        .collect();
    Cart::from_entries(entries).unwrap()
}

/// Shared state of the in-process catalog server.
#[derive(Clone, Default)]
pub struct CatalogServerState {
    pub stock: Arc<Mutex<HashMap<i32, u32>>>,
    pub products: Arc<Mutex<HashMap<i32, Product>>>,
    pub product_hits: Arc<AtomicUsize>,
    pub last_authorization: Arc<Mutex<Option<String>>>,
    pub delay: Option<Duration>,
}

async fn serve_stock(
    State(state): State<CatalogServerState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    *state.last_authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    if id == 500 {
        return (StatusCode::INTERNAL_SERVER_ERROR, "stock service down").into_response();
    }
    if id == 422 {
        return (StatusCode::OK, "{\"id\": 422, \"amount\": \"lots\"}").into_response();
    }
    let amount = state.stock.lock().unwrap().get(&id).copied();
    match amount {
        Some(amount) => Json(serde_json::json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({}))).into_response(),
    }
}

async fn serve_product(State(state): State<CatalogServerState>, Path(id): Path<i32>) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    let product = state.products.lock().unwrap().get(&id).cloned();
    match product {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({}))).into_response(),
    }
}

/// Start a catalog API on `127.0.0.1:0` serving `/stock/{id}` and
/// `/products/{id}`.
///
/// Stock id 500 always answers `500`; stock id 422 answers malformed JSON.
pub async fn spawn_catalog_server(state: CatalogServerState) -> SocketAddr {
    let app = Router::new()
        .route("/stock/{id}", get(serve_stock))
        .route("/products/{id}", get(serve_product))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
