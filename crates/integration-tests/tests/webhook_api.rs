//! Webhook API tests against the in-memory store.
//!
//! These drive the full router (routing, JSON extraction, error mapping) without
//! a database, so they run in every `cargo test`.

#![allow(clippy::unwrap_used)]

use affiliate_ledger_core::CommissionRate;
use affiliate_ledger_integration_tests::{memory_app, order_json};
use affiliate_ledger_server::db::Store;
use affiliate_ledger_server::models::NewAffiliate;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

async fn post_json(app: &Router, body: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post("/webhooks/orders")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_discount_code_attribution_over_http() {
    let (app, store) = memory_app();
    let merchant = store.create_merchant("shop.example", "Shop").await.unwrap();
    let promoter = store
        .create_affiliate(&NewAffiliate {
            merchant_id: merchant.id,
            user_id: None,
            discount_code: "SUMMER".to_owned(),
            commission_rate: CommissionRate::new(Decimal::new(25, 2)).unwrap(),
        })
        .await
        .unwrap();

    let (status, body) = post_json(
        &app,
        &order_json("1001", "Shop.Example", "80.00", "SUMMER", "buyer@example.com"),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "created");
    assert_eq!(body["affiliate_id"], promoter.id.as_i32());
    assert_eq!(decimal(&body["commission_owed"]), Decimal::new(20, 0));

    // The buyer was still registered as an affiliate of their own
    assert_eq!(store.affiliates().len(), 2);
    assert_eq!(store.users().len(), 1);
}

#[tokio::test]
async fn test_self_referral_over_http() {
    let (app, store) = memory_app();
    store.create_merchant("shop.example", "Shop").await.unwrap();

    let (status, body) = post_json(
        &app,
        &order_json("1002", "shop.example", "45.50", "", "new@example.com"),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&body["commission_owed"]), Decimal::new(455, 2));

    let affiliates = store.affiliates();
    assert_eq!(affiliates.len(), 1);
    assert_eq!(body["affiliate_id"], affiliates[0].id.as_i32());
}

#[tokio::test]
async fn test_redelivery_is_acknowledged_without_writing() {
    let (app, store) = memory_app();
    store.create_merchant("shop.example", "Shop").await.unwrap();
    let order = order_json("1003", "shop.example", "10", "", "again@example.com");

    let (first, _) = post_json(&app, &order).await;
    let (second, body) = post_json(&app, &order).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["status"], "skipped_duplicate");
    assert_eq!(body["external_order_id"], "1003");
    assert_eq!(store.orders().len(), 1);
}

#[tokio::test]
async fn test_same_order_id_for_different_merchants() {
    let (app, store) = memory_app();
    store.create_merchant("a.example", "A").await.unwrap();
    store.create_merchant("b.example", "B").await.unwrap();

    let (a, _) = post_json(&app, &order_json("1", "a.example", "10", "", "x@example.com")).await;
    let (b, _) = post_json(&app, &order_json("1", "b.example", "10", "", "x@example.com")).await;

    assert_eq!(a, StatusCode::CREATED);
    assert_eq!(b, StatusCode::CREATED);
    assert_eq!(store.orders().len(), 2);
}

#[tokio::test]
async fn test_unknown_merchant_writes_nothing() {
    let (app, store) = memory_app();

    let (status, body) = post_json(
        &app,
        &order_json("1004", "unknown.example", "10", "CODE", "who@example.com"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["merchant_domain"], "unknown.example");
    assert!(store.merchants().is_empty());
    assert!(store.users().is_empty());
    assert!(store.affiliates().is_empty());
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn test_negative_subtotal_is_rejected() {
    let (app, store) = memory_app();
    store.create_merchant("shop.example", "Shop").await.unwrap();

    let (status, body) = post_json(
        &app,
        &order_json("1005", "shop.example", "-5", "", "neg@example.com"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("subtotal_price"));
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, store) = memory_app();

    let response = app
        .oneshot(
            Request::post("/webhooks/orders")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"order_id": 1"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn test_missing_field_is_bad_request_not_unprocessable() {
    let (app, store) = memory_app();
    store.create_merchant("shop.example", "Shop").await.unwrap();

    let mut order = order_json("1006", "shop.example", "10", "", "gone@example.com");
    order.as_object_mut().unwrap().remove("customer_email");
    let (status, body) = post_json(&app, &order).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("customer_email"));
    assert!(store.users().is_empty());
    assert!(store.orders().is_empty());
}
