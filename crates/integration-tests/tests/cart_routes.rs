//! JSON cart API.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use rocket_shoes_core::Cart;
use rocket_shoes_integration_tests::{FakeCatalog, TestCart, cart_of};
use rocket_shoes_storefront::routes;
use rocket_shoes_storefront::state::AppState;
use rocket_shoes_storefront::storage::{CART_KEY, KeyValueStore};

async fn app(catalog: FakeCatalog, initial: Option<&Cart>) -> (Router, TestCart) {
    let t = TestCart::open(catalog, initial).await;
    let state = AppState::new(t.cart.clone());
    (routes::routes().with_state(state), t)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(FakeCatalog::default(), None).await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_show_cart_renders_totals() {
    let initial = cart_of(&[(1, 2), (2, 1)]);
    let (app, _) = app(FakeCatalog::default(), Some(&initial)).await;

    let (status, body) = send(&app, "GET", "/cart", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["itemCount"], 2);
    assert_eq!(body["totalUnits"], 3);
    assert_eq!(body["total"], initial.subtotal().display());
    assert_eq!(body["items"][0]["productId"], 1);
    assert_eq!(body["items"][0]["amount"], 2);
    assert_eq!(
        body["items"][0]["subtotal"],
        initial.entries()[0].line_total().display()
    );
}

#[tokio::test]
async fn test_add_item_applies_and_has_no_notice() {
    let (app, t) = app(FakeCatalog::with_stock(&[(5, 3)]), None).await;

    let (status, body) = send(&app, "POST", "/cart/items", Some(json!({ "productId": 5 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"], Value::Null);
    assert_eq!(body["cart"]["items"][0]["productId"], 5);
    assert_eq!(body["cart"]["items"][0]["amount"], 1);
    t.assert_in_sync().await;
}

#[tokio::test]
async fn test_rejected_add_is_ok_with_notice() {
    let initial = cart_of(&[(1, 2)]);
    let (app, _) = app(FakeCatalog::with_stock(&[(1, 2)]), Some(&initial)).await;

    let (status, body) = send(&app, "POST", "/cart/items", Some(json!({ "productId": 1 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["code"], "out_of_stock");
    assert_eq!(body["notice"]["message"], "Requested quantity out of stock");
    assert_eq!(body["cart"]["items"][0]["amount"], 2);
}

#[tokio::test]
async fn test_update_amount() {
    let initial = cart_of(&[(2, 1)]);
    let (app, _) = app(FakeCatalog::with_stock(&[(2, 5)]), Some(&initial)).await;

    let (status, body) = send(&app, "PATCH", "/cart/items/2", Some(json!({ "amount": 4 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"], Value::Null);
    assert_eq!(body["cart"]["items"][0]["amount"], 4);
}

#[tokio::test]
async fn test_update_to_zero_is_ignored() {
    let initial = cart_of(&[(2, 3)]);
    let (app, t) = app(FakeCatalog::with_stock(&[(2, 5)]), Some(&initial)).await;

    let (status, body) = send(&app, "PATCH", "/cart/items/2", Some(json!({ "amount": 0 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"], Value::Null);
    assert_eq!(body["cart"]["items"][0]["amount"], 3);
    assert!(t.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_remove_item() {
    let initial = cart_of(&[(1, 1), (2, 1)]);
    let (app, _) = app(FakeCatalog::default(), Some(&initial)).await;

    let (status, body) = send(&app, "DELETE", "/cart/items/1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["itemCount"], 1);
    assert_eq!(body["cart"]["items"][0]["productId"], 2);
}

#[tokio::test]
async fn test_remove_absent_item_has_notice() {
    let (app, _) = app(FakeCatalog::default(), None).await;

    let (status, body) = send(&app, "DELETE", "/cart/items/9", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["code"], "remove_failed");
    assert_eq!(body["notice"]["message"], "Error removing product");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, t) = app(FakeCatalog::with_stock(&[(1, 1)]), None).await;

    let (status, _) = send(&app, "POST", "/cart/items", Some(json!({ "product": "one" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(t.catalog.stock_calls(), 0);
}

#[tokio::test]
async fn test_non_numeric_product_id_is_bad_request() {
    let (app, _) = app(FakeCatalog::default(), None).await;

    let (status, _) = send(&app, "DELETE", "/cart/items/abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = app(FakeCatalog::default(), None).await;

    let (status, _) = send(&app, "GET", "/checkout", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_show_cart_reflects_stored_changes_from_elsewhere() {
    let (app, t) = app(FakeCatalog::default(), None).await;
    let written = cart_of(&[(6, 2)]);
    t.store.set(CART_KEY, &written.encode().unwrap()).await.unwrap();

    let (status, body) = send(&app, "GET", "/cart", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["productId"], 6);
    assert_eq!(body["items"][0]["amount"], 2);
    assert_eq!(t.cart.snapshot(), written);
}
