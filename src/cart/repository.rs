// Cart persistence. Mutations run against a connection owned by the
// service's transaction: the cart row is taken FOR UPDATE first, so all
// read-modify-write sequences for one cart serialize at the database.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::cart::engine::{CartLine, CartState};
use crate::cart::models::{CartRow, PricedLineRow};
use crate::coupons::models::CouponSnapshot;

const CART_COLUMNS: &str = "id, user_id, coupon_code, coupon_description, coupon_discount_type, \
     coupon_discount_value, coupon_min_purchase, coupon_max_discount, coupon_expiry_date, \
     coupon_is_active, created_at, updated_at";

/// Flat row for the cart view join; folded into CartItemResponse by the
/// service.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartViewRow {
    pub product_id: Uuid,
    pub title: String,
    pub brand: String,
    pub price: Decimal,
    pub discount_price: Decimal,
    pub images: Vec<String>,
    pub size: String,
    pub quantity: i32,
}

/// Repository for cart rows and their items
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Lock the user's cart row, creating it first if this is the user's
    /// first mutation. Row-level lock held until the transaction ends.
    pub async fn find_or_create_locked(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<CartRow, sqlx::Error> {
        sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_one(conn)
        .await
    }

    /// Lock the user's cart row without creating one
    pub async fn find_locked(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Option<CartRow>, sqlx::Error> {
        sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(conn)
        .await
    }

    /// Load the cart's lines with unit prices resolved from the catalog
    pub async fn load_state(
        conn: &mut PgConnection,
        cart: &CartRow,
    ) -> Result<CartState, sqlx::Error> {
        let rows = sqlx::query_as::<_, PricedLineRow>(
            r#"
            SELECT ci.product_id, ci.size, ci.quantity, p.discount_price
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            "#,
        )
        .bind(cart.id)
        .fetch_all(conn)
        .await?;

        let lines = rows
            .into_iter()
            .map(|row| CartLine {
                product_id: row.product_id,
                size: row.size,
                quantity: row.quantity,
                unit_price: row.discount_price,
            })
            .collect();

        Ok(CartState::new(lines, cart.coupon_snapshot()))
    }

    /// Write the engine state back: lines are replaced wholesale and the
    /// coupon column group is rewritten. Only called under the row lock.
    pub async fn save_state(
        conn: &mut PgConnection,
        cart_id: Uuid,
        state: &CartState,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *conn)
            .await?;

        for line in &state.lines {
            sqlx::query(
                "INSERT INTO cart_items (cart_id, product_id, size, quantity) VALUES ($1, $2, $3, $4)",
            )
            .bind(cart_id)
            .bind(line.product_id)
            .bind(&line.size)
            .bind(line.quantity)
            .execute(&mut *conn)
            .await?;
        }

        Self::save_coupon(conn, cart_id, state.applied_coupon.as_ref()).await
    }

    /// Rewrite the coupon snapshot column group
    pub async fn save_coupon(
        conn: &mut PgConnection,
        cart_id: Uuid,
        snapshot: Option<&CouponSnapshot>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE carts
            SET coupon_code = $1,
                coupon_description = $2,
                coupon_discount_type = $3,
                coupon_discount_value = $4,
                coupon_min_purchase = $5,
                coupon_max_discount = $6,
                coupon_expiry_date = $7,
                coupon_is_active = $8,
                updated_at = NOW()
            WHERE id = $9
            "#,
        )
        .bind(snapshot.map(|s| s.code.clone()))
        .bind(snapshot.and_then(|s| s.description.clone()))
        .bind(snapshot.map(|s| s.discount_type))
        .bind(snapshot.map(|s| s.discount_value))
        .bind(snapshot.map(|s| s.min_purchase))
        .bind(snapshot.and_then(|s| s.max_discount))
        .bind(snapshot.map(|s| s.expiry_date))
        .bind(snapshot.map(|s| s.is_active))
        .bind(cart_id)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Empty a user's cart: items gone, coupon cleared, row kept.
    /// Shared by the cart-clear endpoint and checkout finalization, and
    /// safe to call when the user has no cart yet.
    pub async fn clear_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), sqlx::Error> {
        let cart_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(cart_id) = cart_id else {
            return Ok(());
        };

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *conn)
            .await?;

        Self::save_coupon(conn, cart_id, None).await
    }

    /// Selling price for a product, or None when the product is unknown
    pub async fn product_price(
        conn: &mut PgConnection,
        product_id: Uuid,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        sqlx::query_scalar("SELECT discount_price FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(conn)
            .await
    }

    /// Read-only cart fetch for the view path (no locks)
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<CartRow>, sqlx::Error> {
        sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Cart lines joined with product details for responses
    pub async fn load_view_rows(&self, cart_id: Uuid) -> Result<Vec<CartViewRow>, sqlx::Error> {
        sqlx::query_as::<_, CartViewRow>(
            r#"
            SELECT p.id AS product_id, p.title, p.brand, p.price, p.discount_price, p.images,
                   ci.size, ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
    }
}
