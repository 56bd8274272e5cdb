use sqlx::PgPool;
use uuid::Uuid;

use crate::coupons::models::{Coupon, CreateCoupon, UpdateCoupon};
use crate::error::ApiError;

const COUPON_COLUMNS: &str = "id, code, description, discount_type, discount_value, min_purchase, \
     max_discount, expiry_date, is_active, created_at, updated_at";

/// Repository for coupon catalog operations
#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Case-insensitive lookup; codes are stored upper-cased.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, sqlx::Error> {
        let normalized = code.trim().to_uppercase();
        sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1"
        ))
        .bind(normalized)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(&self, request: &CreateCoupon) -> Result<Coupon, ApiError> {
        let code = request.code.trim().to_uppercase();

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            r#"
            INSERT INTO coupons
                (code, description, discount_type, discount_value, min_purchase, max_discount, expiry_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COUPON_COLUMNS}
            "#
        ))
        .bind(&code)
        .bind(&request.description)
        .bind(request.discount_type)
        .bind(request.discount_value)
        .bind(request.min_purchase)
        .bind(request.max_discount)
        .bind(request.expiry_date)
        .bind(request.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return ApiError::Conflict {
                        message: format!("Coupon with code '{}' already exists", code),
                    };
                }
            }
            ApiError::DatabaseError(e)
        })?;

        Ok(coupon)
    }

    /// All coupons, newest first (admin listing).
    pub async fn list(&self) -> Result<Vec<Coupon>, ApiError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    pub async fn update(&self, id: Uuid, request: &UpdateCoupon) -> Result<Coupon, ApiError> {
        let existing = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Coupon".to_string(),
            id: id.to_string(),
        })?;

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            r#"
            UPDATE coupons
            SET description = $1,
                discount_type = $2,
                discount_value = $3,
                min_purchase = $4,
                max_discount = $5,
                expiry_date = $6,
                is_active = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING {COUPON_COLUMNS}
            "#
        ))
        .bind(request.description.as_ref().or(existing.description.as_ref()))
        .bind(request.discount_type.unwrap_or(existing.discount_type))
        .bind(request.discount_value.unwrap_or(existing.discount_value))
        .bind(request.min_purchase.unwrap_or(existing.min_purchase))
        .bind(request.max_discount.or(existing.max_discount))
        .bind(request.expiry_date.unwrap_or(existing.expiry_date))
        .bind(request.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(coupon)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: "Coupon".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
