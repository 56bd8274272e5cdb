// HTTP handlers for cart endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::cart::error::CartError;
use crate::cart::models::{
    AddItemRequest, ApplyCouponRequest, CartResponse, ClearCartResponse, RemoveItemRequest,
    UpdateQuantityRequest, UserCartRequest,
};

/// Handler for POST /api/cart/add
pub async fn add_item_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, CartError> {
    request
        .validate()
        .map_err(|e| CartError::ValidationError(e.to_string()))?;

    let cart = state.cart_service.add_item(&request).await?;
    Ok(Json(cart))
}

/// Handler for GET /api/cart/:user_id
pub async fn get_cart_handler(
    State(state): State<crate::AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<CartResponse>, CartError> {
    let cart = state.cart_service.get_cart(user_id).await?;
    Ok(Json(cart))
}

/// Handler for DELETE /api/cart/remove
pub async fn remove_item_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartResponse>, CartError> {
    request
        .validate()
        .map_err(|e| CartError::ValidationError(e.to_string()))?;

    let cart = state.cart_service.remove_item(&request).await?;
    Ok(Json(cart))
}

/// Handler for POST /api/cart/update-qty
/// The quantity field is a signed delta, not an absolute value.
pub async fn update_quantity_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>, CartError> {
    request
        .validate()
        .map_err(|e| CartError::ValidationError(e.to_string()))?;

    let cart = state.cart_service.update_quantity(&request).await?;
    Ok(Json(cart))
}

/// Handler for POST /api/cart/apply-coupon
pub async fn apply_coupon_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<ApplyCouponRequest>,
) -> Result<Json<CartResponse>, CartError> {
    request
        .validate()
        .map_err(|e| CartError::ValidationError(e.to_string()))?;

    let cart = state.cart_service.apply_coupon(&request).await?;
    Ok(Json(cart))
}

/// Handler for POST /api/cart/remove-coupon
pub async fn remove_coupon_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<UserCartRequest>,
) -> Result<Json<CartResponse>, CartError> {
    let cart = state.cart_service.remove_coupon(request.user_id).await?;
    Ok(Json(cart))
}

/// Handler for POST /api/cart/clear
pub async fn clear_cart_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<UserCartRequest>,
) -> Result<Json<ClearCartResponse>, CartError> {
    state.cart_service.clear(request.user_id).await?;
    Ok(Json(ClearCartResponse { success: true }))
}
