// Razorpay client: provider-side order creation over REST and callback
// signature verification.
//
// The callback signature is HMAC-SHA256 over "{order_id}|{payment_id}"
// keyed with the API secret, hex-encoded by the provider.

use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

use crate::payments::error::PaymentError;

type HmacSha256 = Hmac<Sha256>;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Provider order as returned by the orders endpoint
#[derive(Debug, Deserialize)]
pub struct ProviderOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Razorpay API client
#[derive(Clone)]
pub struct RazorpayClient {
    key_id: String,
    key_secret: String,
    http: reqwest::Client,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            key_id,
            key_secret,
            http: reqwest::Client::new(),
        }
    }

    /// Create a provider-side order. The caller supplies the amount in
    /// major units (rupees); Razorpay expects minor units (paise).
    pub async fn create_order(&self, amount: Decimal) -> Result<ProviderOrder, PaymentError> {
        let amount_paise = (amount * Decimal::from(100))
            .trunc()
            .to_i64()
            .ok_or_else(|| PaymentError::ValidationError("Amount out of range".to_string()))?;

        let response = self
            .http
            .post(format!("{}/orders", RAZORPAY_API_BASE))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_paise,
                "currency": "INR",
            }))
            .send()
            .await
            .map_err(|e| PaymentError::ProviderError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PaymentError::ProviderError(format!(
                "Provider returned {}",
                response.status()
            )));
        }

        response
            .json::<ProviderOrder>()
            .await
            .map_err(|e| PaymentError::ProviderError(e.to_string()))
    }

    /// Verify a callback signature. The comparison runs in constant time
    /// through the MAC's own verification.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_signature(&self.key_secret, order_id, payment_id, signature)
    }
}

/// Signature check as a free function so it can be exercised without a
/// configured client.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());

    match hex::decode(signature) {
        Ok(decoded) => mac.verify_slice(&decoded).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_razorpay_secret";

    // Produce the signature the way the provider does
    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let signature = sign(SECRET, "order_MkWvqSM4cF3V1a", "pay_MkX0Y5FHpPrw2z");
        assert!(verify_signature(
            SECRET,
            "order_MkWvqSM4cF3V1a",
            "pay_MkX0Y5FHpPrw2z",
            &signature
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let mut signature = sign(SECRET, "order_MkWvqSM4cF3V1a", "pay_MkX0Y5FHpPrw2z");
        // flip the last hex digit
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });

        assert!(!verify_signature(
            SECRET,
            "order_MkWvqSM4cF3V1a",
            "pay_MkX0Y5FHpPrw2z",
            &signature
        ));
    }

    #[test]
    fn test_signature_for_different_payment_rejected() {
        let signature = sign(SECRET, "order_MkWvqSM4cF3V1a", "pay_MkX0Y5FHpPrw2z");
        assert!(!verify_signature(
            SECRET,
            "order_MkWvqSM4cF3V1a",
            "pay_other",
            &signature
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = sign("another_secret", "order_MkWvqSM4cF3V1a", "pay_MkX0Y5FHpPrw2z");
        assert!(!verify_signature(
            SECRET,
            "order_MkWvqSM4cF3V1a",
            "pay_MkX0Y5FHpPrw2z",
            &signature
        ));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(!verify_signature(SECRET, "order_x", "pay_y", "zz-not-hex"));
        assert!(!verify_signature(SECRET, "order_x", "pay_y", ""));
    }

    #[test]
    fn test_client_verify_delegates() {
        let client = RazorpayClient::new("rzp_test_key".to_string(), SECRET.to_string());
        let signature = sign(SECRET, "order_a", "pay_b");

        assert!(client.verify_signature("order_a", "pay_b", &signature));
        assert!(!client.verify_signature("order_b", "pay_b", &signature));
    }
}
