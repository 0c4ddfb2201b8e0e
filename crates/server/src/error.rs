//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side failures to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::IngestError;

/// Application-level error type for the ledger server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order ingestion failed.
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Request body could not be parsed into an order payload.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    /// Whether this error is our fault rather than the caller's.
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Ingest(IngestError::Store(_) | IngestError::Registration(_))
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Ingest(err) => match err {
                IngestError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
                IngestError::UnresolvableAffiliate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                IngestError::Store(_) | IngestError::Registration(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Ingest(IngestError::InvalidPayload(msg)) | Self::BadRequest(msg) => msg.clone(),
            Self::Ingest(IngestError::UnresolvableAffiliate { .. }) => {
                "No affiliate could be attributed to this order".to_string()
            }
            _ if self.is_server_error() => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use affiliate_ledger_core::{Email, MerchantId};

    use super::*;
    use crate::db::StoreError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("missing field `order_id`".to_string());
        assert_eq!(err.to_string(), "Bad request: missing field `order_id`");
    }

    #[test]
    fn test_bad_request_status_code() {
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_ingest_error_status_codes() {
        assert_eq!(
            get_status(IngestError::InvalidPayload("bad".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                IngestError::UnresolvableAffiliate {
                    merchant_id: MerchantId::new(1),
                    external_order_id: "1001".to_string(),
                    customer_email: Email::parse("a@b.c").unwrap(),
                }
                .into()
            ),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(IngestError::Store(StoreError::NotFound).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
