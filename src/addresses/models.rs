use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Saved delivery address
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub country: String,
    pub zip: String,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating an address
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddress {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(length(min = 1, message = "Address line is required"))]
    pub address1: String,
    pub address2: Option<String>,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[validate(length(min = 1, message = "ZIP is required"))]
    pub zip: String,
    #[validate(custom = "crate::validation::validate_mobile_number")]
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

fn default_country() -> String {
    "India".to_string()
}

/// Partial update for an address
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    #[validate(custom = "crate::validation::validate_mobile_number")]
    pub phone: Option<String>,
    pub is_default: Option<bool>,
}
