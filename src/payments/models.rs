use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::orders::models::CreateOrderRequest;

/// Request DTO for creating a provider-side payment order.
/// The amount is in major units; the provider call converts to minor.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentOrderRequest {
    pub amount: Decimal,
}

/// Provider order as returned to the client; amount is in minor units
/// (paise), the way the provider reports it.
#[derive(Debug, Serialize)]
pub struct CreatePaymentOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}

/// Request DTO for payment verification: the provider's callback triple
/// plus the full order payload to place once the signature checks out.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(flatten)]
    pub order: CreateOrderRequest,
}
