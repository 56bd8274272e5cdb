// HTTP handlers for authentication endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AdminUser,
    models::{AdminLoginRequest, AuthResponse, OtpSentResponse, SendOtpRequest, UserResponse,
        VerifyOtpRequest},
};

/// Handler for POST /api/auth/admin/login
pub async fn admin_login_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .admin_login(&request.email, &request.password)
        .await?;

    Ok(Json(response))
}

/// Handler for POST /api/auth/send-otp
/// Rate limited at the router layer.
pub async fn send_otp_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<OtpSentResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    state.auth_service.send_otp(&request.phone).await?;

    Ok(Json(OtpSentResponse {
        message: "OTP sent successfully".to_string(),
        phone: request.phone,
    }))
}

/// Handler for POST /api/auth/verify-otp
pub async fn verify_otp_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .verify_otp(&request.phone, &request.otp)
        .await?;

    Ok(Json(response))
}

/// Handler for PATCH /api/auth/users/:id/block (admin)
pub async fn block_user_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AuthError> {
    let user = state.auth_service.set_blocked(user_id, true).await?;
    Ok(Json(user))
}

/// Handler for PATCH /api/auth/users/:id/unblock (admin)
pub async fn unblock_user_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AuthError> {
    let user = state.auth_service.set_blocked(user_id, false).await?;
    Ok(Json(user))
}
