use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Represents a product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Linen Oversized Shirt")]
    pub title: String,
    #[schema(example = "Northloom")]
    pub brand: String,
    #[schema(example = "NL-SHIRT-0042")]
    pub sku: String,
    /// Listed price in major currency units
    pub price: Decimal,
    /// Effective selling price; cart totals are computed from this
    pub discount_price: Decimal,
    pub discount_percent: i32,
    pub stock: i32,
    #[schema(example = "Active", pattern = "Active|Inactive")]
    pub status: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a product. discount_percent is derived from
/// price vs discount_price, never supplied by the client.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    pub price: Decimal,
    pub discount_price: Decimal,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i32,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial update for a product; omitted fields keep their current value.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProduct {
    pub title: Option<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

/// Slim product view embedded in cart and order responses
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub title: String,
    pub brand: String,
    pub price: Decimal,
    pub discount_price: Decimal,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Section {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSection {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Derive the rounded percentage discount from list vs selling price.
/// Returns 0 when the price is not positive or the discount is negative.
pub fn derive_discount_percent(price: Decimal, discount_price: Decimal) -> i32 {
    use rust_decimal::prelude::ToPrimitive;

    if price <= Decimal::ZERO || discount_price >= price {
        return 0;
    }
    let percent = (price - discount_price) / price * Decimal::from(100);
    percent.round().to_i32().unwrap_or(0)
}
