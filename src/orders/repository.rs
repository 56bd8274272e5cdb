use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::orders::error::OrderError;
use crate::orders::models::{CreateOrderRequest, Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, user_id, address_name, address_phone, address_full, \
     address_city, address_zip, subtotal, coupon_code, discount_amount, payment_method, \
     delivery_option, shipping_fee, total_amount, status, razorpay_order_id, \
     razorpay_payment_id, created_at, updated_at";

/// Order line joined against the catalog; product fields are null when
/// the product has since been deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemViewRow {
    pub product_id: Uuid,
    pub size: String,
    pub quantity: i32,
    pub price: Decimal,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub list_price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub images: Option<Vec<String>>,
}

/// Repository for order operations
#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert an order with its items. Runs on the caller's connection so
    /// checkout can pair it with the cart clear in one transaction.
    pub async fn create(
        conn: &mut PgConnection,
        request: &CreateOrderRequest,
        status: OrderStatus,
        razorpay_order_id: Option<&str>,
        razorpay_payment_id: Option<&str>,
    ) -> Result<Order, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders
                (user_id, address_name, address_phone, address_full, address_city, address_zip,
                 subtotal, coupon_code, discount_amount, payment_method, delivery_option,
                 shipping_fee, total_amount, status, razorpay_order_id, razorpay_payment_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(request.user_id)
        .bind(&request.address.name)
        .bind(&request.address.phone)
        .bind(&request.address.full_address)
        .bind(&request.address.city)
        .bind(&request.address.zip)
        .bind(request.subtotal)
        .bind(&request.coupon_code)
        .bind(request.discount_amount)
        .bind(request.payment_method)
        .bind(request.delivery_option)
        .bind(request.shipping_fee)
        .bind(request.total_amount)
        .bind(status)
        .bind(razorpay_order_id)
        .bind(razorpay_payment_id)
        .fetch_one(&mut *conn)
        .await?;

        for item in &request.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, size, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.size)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *conn)
            .await?;
        }

        Ok(order)
    }

    pub async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// All orders, optionally filtered by user, newest first
    pub async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<Order>, OrderError> {
        let orders = match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    /// Lines with catalog details resolved (left join: ordered products
    /// may have been removed from the catalog since)
    pub async fn item_views_for(&self, order_id: Uuid) -> Result<Vec<OrderItemViewRow>, OrderError> {
        let rows = sqlx::query_as::<_, OrderItemViewRow>(
            r#"
            SELECT oi.product_id, oi.size, oi.quantity, oi.price,
                   p.title, p.brand, p.price AS list_price, p.discount_price, p.images
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Overwrite the status; transition validity is the service's job
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new_status)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound)?;

        Ok(order)
    }
}
