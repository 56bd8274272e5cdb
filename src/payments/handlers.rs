// HTTP handlers for payment endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::orders::models::OrderResponse;
use crate::payments::error::PaymentError;
use crate::payments::models::{
    CreatePaymentOrderRequest, CreatePaymentOrderResponse, VerifyPaymentRequest,
};

/// Handler for POST /api/payment/razorpay/create-order
/// Creates the provider-side order; nothing is persisted locally yet.
pub async fn create_payment_order_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreatePaymentOrderRequest>,
) -> Result<Json<CreatePaymentOrderResponse>, PaymentError> {
    if crate::validation::validate_positive_amount(request.amount).is_err() {
        return Err(PaymentError::ValidationError(
            "Amount must be positive".to_string(),
        ));
    }

    let provider_order = state.razorpay.create_order(request.amount).await?;

    Ok(Json(CreatePaymentOrderResponse {
        order_id: provider_order.id,
        amount: provider_order.amount,
        currency: provider_order.currency,
    }))
}

/// Handler for POST /api/payment/razorpay/verify
/// Recomputes the callback signature; a mismatch rejects the request
/// with no side effects. A match places the order as Paid and clears
/// the buyer's cart, the same finalization the COD path runs.
pub async fn verify_payment_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), PaymentError> {
    if !state.razorpay.verify_signature(
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
    ) {
        return Err(PaymentError::SignatureMismatch);
    }

    request
        .order
        .validate()
        .map_err(|e| PaymentError::ValidationError(e.to_string()))?;
    request
        .order
        .address
        .validate()
        .map_err(|e| PaymentError::ValidationError(e.to_string()))?;

    let order = state
        .order_service
        .create_paid_order(
            &request.order,
            &request.razorpay_order_id,
            &request.razorpay_payment_id,
        )
        .await?;
    let response = state.order_service.get_order(order.id).await?;

    Ok((StatusCode::CREATED, Json(response)))
}
