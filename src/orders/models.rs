use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::ProductSummary;

/// Order status enum. A closed set with guarded transitions; there is no
/// free-form status, and terminal states stay terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the order is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Online,
}

/// How the order is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
    Standard,
    Home,
}

/// Delivery address as captured on the order: a denormalized copy, not a
/// reference into the address book.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderAddress {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub full_address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "ZIP is required"))]
    pub zip: String,
}

/// Domain model representing an order row
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_name: String,
    pub address_phone: String,
    pub address_full: String,
    pub address_city: String,
    pub address_zip: String,
    pub subtotal: Decimal,
    pub coupon_code: Option<String>,
    pub discount_amount: Option<Decimal>,
    pub payment_method: PaymentMethod,
    pub delivery_option: DeliveryOption,
    pub shipping_fee: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request line for order creation. The price is the unit price the
/// caller checked out at; it is captured onto the order as-is.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Size is required"))]
    pub size: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub price: Decimal,
}

/// Request DTO for creating an order (COD checkout and the payload
/// accompanying online payment verification)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
    pub address: OrderAddress,
    pub payment_method: PaymentMethod,
    pub delivery_option: DeliveryOption,
    pub shipping_fee: Decimal,
    pub subtotal: Decimal,
    pub total_amount: Decimal,
    pub coupon_code: Option<String>,
    pub discount_amount: Option<Decimal>,
}

/// Request DTO for updating order status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Response DTO for an order line, with catalog details resolved when
/// the product still exists
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product: Option<ProductSummary>,
    pub size: String,
    pub quantity: i32,
    pub price: Decimal,
    pub line_total: Decimal,
}

/// Response DTO for an order with items
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: OrderAddress,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: Decimal,
    pub coupon_code: Option<String>,
    pub discount_amount: Option<Decimal>,
    pub payment_method: PaymentMethod,
    pub delivery_option: DeliveryOption,
    pub shipping_fee: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn address(&self) -> OrderAddress {
        OrderAddress {
            name: self.address_name.clone(),
            phone: self.address_phone.clone(),
            full_address: self.address_full.clone(),
            city: self.address_city.clone(),
            zip: self.address_zip.clone(),
        }
    }
}
