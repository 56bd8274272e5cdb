use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::orders::OrderError;

/// Error types for payment operations
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The callback signature did not match; nothing was created.
    #[error("Invalid signature")]
    SignatureMismatch,

    #[error("Payment provider error: {0}")]
    ProviderError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        match self {
            PaymentError::SignatureMismatch => {
                tracing::warn!("Payment signature verification failed");
                let body = Json(json!({ "error": "Invalid signature" }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            PaymentError::ProviderError(msg) => {
                tracing::error!("Payment provider error: {}", msg);
                let body = Json(json!({ "error": "Payment provider error" }));
                (StatusCode::BAD_GATEWAY, body).into_response()
            }
            PaymentError::ValidationError(msg) => {
                let body = Json(json!({ "error": msg }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            PaymentError::Order(err) => err.into_response(),
        }
    }
}
