// HTTP handlers for order endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AdminUser;
use crate::orders::models::{CreateOrderRequest, OrderResponse, UpdateStatusRequest};
use crate::orders::OrderError;

/// Handler for POST /api/orders/create
/// COD checkout; online payments go through the payment verification
/// endpoint instead.
pub async fn create_order_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;
    request
        .address
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let order = state.order_service.create_order(&request).await?;
    let response = state.order_service.get_order(order.id).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/orders
pub async fn list_orders_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<OrderResponse>>, OrderError> {
    let orders = state.order_service.list_orders(None).await?;
    Ok(Json(orders))
}

/// Handler for GET /api/orders/user/:user_id
pub async fn list_user_orders_handler(
    State(state): State<crate::AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<OrderResponse>>, OrderError> {
    let orders = state.order_service.list_orders(Some(user_id)).await?;
    Ok(Json(orders))
}

/// Handler for GET /api/orders/:order_id
pub async fn get_order_handler(
    State(state): State<crate::AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = state.order_service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Handler for PUT /api/orders/cancel/:order_id
pub async fn cancel_order_handler(
    State(state): State<crate::AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = state.order_service.cancel_order(order_id).await?;
    Ok(Json(order))
}

/// Handler for PUT /api/orders/update-status/:order_id (admin)
pub async fn update_order_status_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = state
        .order_service
        .set_status(order_id, request.status)
        .await?;
    Ok(Json(order))
}
