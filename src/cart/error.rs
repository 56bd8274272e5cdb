use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::coupons::validator::CouponRejection;

/// Error types for cart operations
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cart not found")]
    CartNotFound,

    #[error("Item not found in cart")]
    ItemNotFound,

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    CouponRejected(#[from] CouponRejection),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        CartError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            CartError::DatabaseError(msg) => {
                tracing::error!("Cart database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            CartError::CartNotFound => (StatusCode::NOT_FOUND, "Cart not found".to_string()),
            CartError::ItemNotFound => {
                (StatusCode::NOT_FOUND, "Item not found in cart".to_string())
            }
            CartError::ProductNotFound(id) => (
                StatusCode::BAD_REQUEST,
                format!("Product with id {} not found", id),
            ),
            CartError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            CartError::CouponRejected(rejection) => (StatusCode::BAD_REQUEST, rejection.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
