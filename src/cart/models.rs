use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::coupons::models::{CouponSnapshot, DiscountType};
use crate::models::ProductSummary;

/// Cart row as stored. The applied coupon is flattened into nullable
/// columns; coupon_code doubles as the presence flag.
#[derive(Debug, Clone, FromRow)]
pub struct CartRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coupon_code: Option<String>,
    pub coupon_description: Option<String>,
    pub coupon_discount_type: Option<DiscountType>,
    pub coupon_discount_value: Option<Decimal>,
    pub coupon_min_purchase: Option<Decimal>,
    pub coupon_max_discount: Option<Decimal>,
    pub coupon_expiry_date: Option<DateTime<Utc>>,
    pub coupon_is_active: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartRow {
    /// Rebuild the coupon snapshot from the column group. The group is
    /// written atomically, so a present code implies the rest.
    pub fn coupon_snapshot(&self) -> Option<CouponSnapshot> {
        let code = self.coupon_code.clone()?;
        Some(CouponSnapshot {
            code,
            description: self.coupon_description.clone(),
            discount_type: self.coupon_discount_type.unwrap_or(DiscountType::Percent),
            discount_value: self.coupon_discount_value.unwrap_or(Decimal::ZERO),
            min_purchase: self.coupon_min_purchase.unwrap_or(Decimal::ZERO),
            max_discount: self.coupon_max_discount,
            expiry_date: self
                .coupon_expiry_date
                .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC),
            is_active: self.coupon_is_active.unwrap_or(false),
        })
    }
}

/// Cart line joined with its catalog selling price
#[derive(Debug, Clone, FromRow)]
pub struct PricedLineRow {
    pub product_id: Uuid,
    pub size: String,
    pub quantity: i32,
    pub discount_price: Decimal,
}

/// Request DTO for POST /api/cart/add
#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Size is required"))]
    pub size: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Request DTO for POST /api/cart/update-qty; quantity is a signed delta
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Size is required"))]
    pub size: String,
    pub quantity: i32,
}

/// Request DTO for DELETE /api/cart/remove
#[derive(Debug, Deserialize, Validate)]
pub struct RemoveItemRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Size is required"))]
    pub size: String,
}

/// Request DTO for POST /api/cart/apply-coupon
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyCouponRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "Coupon code is required"))]
    pub code: String,
}

/// Request DTO for the operations keyed by user only
/// (remove-coupon, clear)
#[derive(Debug, Deserialize)]
pub struct UserCartRequest {
    pub user_id: Uuid,
}

/// Response line with resolved product details
#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub product: ProductSummary,
    pub size: String,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// Cart response with computed pricing. get_cart never 404s: a user
/// without a cart sees the empty shape.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub user_id: Uuid,
    pub items: Vec<CartItemResponse>,
    pub applied_coupon: Option<CouponSnapshot>,
    pub cart_total: Decimal,
    pub discount_amount: Decimal,
    pub payable_total: Decimal,
}

impl CartResponse {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            applied_coupon: None,
            cart_total: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            payable_total: Decimal::ZERO,
        }
    }
}

/// Success flag body for POST /api/cart/clear
#[derive(Debug, Serialize)]
pub struct ClearCartResponse {
    pub success: bool,
}
