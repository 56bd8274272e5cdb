// HTTP handlers for coupon catalog endpoints.
// Mutations are admin-only; the storefront only ever sees coupons
// through the cart's apply-coupon flow.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AdminUser;
use crate::coupons::models::{Coupon, CreateCoupon, UpdateCoupon};
use crate::error::ApiError;
use crate::validation::field_error;

/// Handler for POST /api/coupons (admin)
pub async fn create_coupon_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateCoupon>,
) -> Result<(StatusCode, Json<Coupon>), ApiError> {
    request.validate()?;
    if request.discount_value <= Decimal::ZERO {
        return Err(field_error("discount_value", "amount_must_be_positive").into());
    }
    if request.min_purchase < Decimal::ZERO {
        return Err(field_error("min_purchase", "amount_must_not_be_negative").into());
    }

    let coupon = state.coupon_repo.create(&request).await?;

    tracing::info!("Created coupon {}", coupon.code);
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Handler for GET /api/coupons
pub async fn list_coupons_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<Coupon>>, ApiError> {
    let coupons = state.coupon_repo.list().await?;
    Ok(Json(coupons))
}

/// Handler for PATCH /api/coupons/:id (admin)
pub async fn update_coupon_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCoupon>,
) -> Result<Json<Coupon>, ApiError> {
    if matches!(request.discount_value, Some(value) if value <= Decimal::ZERO) {
        return Err(field_error("discount_value", "amount_must_be_positive").into());
    }
    if matches!(request.min_purchase, Some(value) if value < Decimal::ZERO) {
        return Err(field_error("min_purchase", "amount_must_not_be_negative").into());
    }

    let coupon = state.coupon_repo.update(id, &request).await?;

    tracing::info!("Updated coupon {}", coupon.code);
    Ok(Json(coupon))
}

/// Handler for DELETE /api/coupons/:id (admin)
pub async fn delete_coupon_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.coupon_repo.delete(id).await?;

    tracing::info!("Deleted coupon {}", id);
    Ok(StatusCode::NO_CONTENT)
}
