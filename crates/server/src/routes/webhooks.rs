//! Order webhook handler.
//!
//! Merchants' storefronts post each completed order here. The response status
//! tells the caller whether to retry:
//!
//! - `201 Created` - order recorded
//! - `200 OK` - order was already recorded (safe to stop retrying)
//! - `404 Not Found` - the merchant domain is not registered
//! - `400 Bad Request` - the body is not a valid order payload
//! - `422 Unprocessable Entity` - the order cannot be attributed to an affiliate
//! - `500` - transient failure, retry later

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

use crate::error::{AppError, Result};
use crate::services::{IngestOutcome, OrderPayload};
use crate::state::AppState;

/// Ingest an order payload.
///
/// # Errors
///
/// Returns an `AppError` if the body cannot be parsed, the payload is invalid,
/// no affiliate can be attributed, or the store fails.
pub async fn ingest_order(
    State(state): State<AppState>,
    payload: std::result::Result<Json<OrderPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestOutcome>)> {
    let Json(payload) =
        payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let outcome = state.ingestor().process_order(&payload).await?;

    let status = match &outcome {
        IngestOutcome::Created(_) => StatusCode::CREATED,
        IngestOutcome::SkippedDuplicate { .. } => StatusCode::OK,
        IngestOutcome::SkippedUnknownMerchant { .. } => StatusCode::NOT_FOUND,
    };

    Ok((status, Json(outcome)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::db::{MemoryStore, Store};
    use crate::routes::router;
    use crate::state::AppState;

    use super::*;

    async fn post_order(store: &MemoryStore, body: Value) -> (StatusCode, Value) {
        let app = router(AppState::new(Arc::new(store.clone())));
        let response = app
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
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn order_body(order_id: &str, domain: &str) -> Value {
        json!({
            "order_id": order_id,
            "subtotal_price": 100.0,
            "merchant_domain": domain,
            "discount_code": "",
            "customer_email": "buyer@example.com",
            "customer_name": "Buyer"
        })
    }

    #[tokio::test]
    async fn test_created_then_duplicate() {
        let store = MemoryStore::new();
        store.create_merchant("shop.example", "Shop").await.unwrap();

        let (status, body) = post_order(&store, order_body("A-1", "shop.example")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "created");
        let owed: Decimal = body["commission_owed"].as_str().unwrap().parse().unwrap();
        assert_eq!(owed, Decimal::new(10, 0));

        let (status, body) = post_order(&store, order_body("A-1", "shop.example")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "skipped_duplicate");
    }

    #[tokio::test]
    async fn test_unknown_merchant_is_not_found() {
        let store = MemoryStore::new();
        let (status, body) = post_order(&store, order_body("A-1", "nowhere.example")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "skipped_unknown_merchant");
    }

    #[tokio::test]
    async fn test_invalid_email_is_bad_request() {
        let store = MemoryStore::new();
        store.create_merchant("shop.example", "Shop").await.unwrap();

        let mut body = order_body("A-1", "shop.example");
        body["customer_email"] = json!("nope");
        let (status, body) = post_order(&store, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("customer_email"));
        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let store = MemoryStore::new();
        store.create_merchant("shop.example", "Shop").await.unwrap();

        let mut body = order_body("A-1", "shop.example");
        body.as_object_mut().unwrap().remove("customer_email");
        let (status, body) = post_order(&store, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("customer_email"));
        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_subtotal_is_bad_request() {
        let store = MemoryStore::new();
        store.create_merchant("shop.example", "Shop").await.unwrap();

        let mut body = order_body("A-1", "shop.example");
        body["subtotal_price"] = json!("abc");
        let (status, body) = post_order(&store, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())));
        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
