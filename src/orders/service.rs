// Order assembly and lifecycle.
//
// Checkout finalization is one routine shared by the COD path and the
// online-payment path: insert the order (with its items) and clear the
// buyer's cart in a single transaction, so an order can never be created
// without its source cart emptying.

use uuid::Uuid;

use crate::cart::repository::CartRepository;
use crate::models::ProductSummary;
use crate::orders::error::OrderError;
use crate::orders::models::{
    CreateOrderRequest, Order, OrderItemResponse, OrderResponse, OrderStatus,
};
use crate::orders::repository::OrdersRepository;
use crate::orders::status_machine::StatusMachine;

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    repo: OrdersRepository,
}

impl OrderService {
    pub fn new(repo: OrdersRepository) -> Self {
        Self { repo }
    }

    /// Finalize a checkout: persist the order and clear the buyer's cart
    /// atomically. The order is written with the caller-supplied items
    /// and totals; totals are not recomputed from current catalog prices.
    async fn finalize_checkout(
        &self,
        request: &CreateOrderRequest,
        status: OrderStatus,
        razorpay_order_id: Option<&str>,
        razorpay_payment_id: Option<&str>,
    ) -> Result<Order, OrderError> {
        self.validate_items(request)?;

        let mut tx = self.repo.pool().begin().await?;

        let order = OrdersRepository::create(
            &mut tx,
            request,
            status,
            razorpay_order_id,
            razorpay_payment_id,
        )
        .await?;

        CartRepository::clear_by_user(&mut tx, request.user_id).await?;

        tx.commit().await?;

        tracing::info!(
            "Created {} order {} for user {}",
            status,
            order.id,
            order.user_id
        );
        Ok(order)
    }

    fn validate_items(&self, request: &CreateOrderRequest) -> Result<(), OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::ValidationError(
                "Order must contain at least one item".to_string(),
            ));
        }
        for item in &request.items {
            if item.quantity <= 0 {
                return Err(OrderError::ValidationError(format!(
                    "Quantity must be positive, got {}",
                    item.quantity
                )));
            }
            if crate::validation::validate_non_negative_amount(item.price).is_err() {
                return Err(OrderError::ValidationError(
                    "Item price must not be negative".to_string(),
                ));
            }
        }
        for (name, amount) in [
            ("shipping_fee", request.shipping_fee),
            ("subtotal", request.subtotal),
            ("total_amount", request.total_amount),
        ] {
            if crate::validation::validate_non_negative_amount(amount).is_err() {
                return Err(OrderError::ValidationError(format!(
                    "{} must not be negative",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Place a COD (or pre-payment) order; starts Pending.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, OrderError> {
        self.finalize_checkout(request, OrderStatus::Pending, None, None)
            .await
    }

    /// Place an order for a verified online payment; starts Paid and
    /// carries the provider's identifiers for audit.
    pub async fn create_paid_order(
        &self,
        request: &CreateOrderRequest,
        razorpay_order_id: &str,
        razorpay_payment_id: &str,
    ) -> Result<Order, OrderError> {
        self.finalize_checkout(
            request,
            OrderStatus::Paid,
            Some(razorpay_order_id),
            Some(razorpay_payment_id),
        )
        .await
    }

    /// All orders (optionally for one user), newest first, with catalog
    /// details resolved per line
    pub async fn list_orders(&self, user_id: Option<Uuid>) -> Result<Vec<OrderResponse>, OrderError> {
        let orders = self.repo.list(user_id).await?;

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            responses.push(self.to_response(order).await?);
        }

        Ok(responses)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, OrderError> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        self.to_response(order).await
    }

    /// Cancel an order through the state machine; cancelling a Delivered
    /// (or already terminal) order is rejected.
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<OrderResponse, OrderError> {
        self.set_status(order_id, OrderStatus::Cancelled).await
    }

    /// Transition an order's status. Invalid transitions are rejected,
    /// never silently overwritten.
    pub async fn set_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderResponse, OrderError> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        StatusMachine::transition(order.status, new_status)
            .map_err(OrderError::InvalidTransition)?;

        let updated = self.repo.update_status(order_id, new_status).await?;

        tracing::info!("Order {} status: {} -> {}", order_id, order.status, new_status);
        self.to_response(updated).await
    }

    async fn to_response(&self, order: Order) -> Result<OrderResponse, OrderError> {
        let rows = self.repo.item_views_for(order.id).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let product = match (row.title, row.brand, row.list_price, row.discount_price) {
                    (Some(title), Some(brand), Some(list_price), Some(discount_price)) => {
                        Some(ProductSummary {
                            id: row.product_id,
                            title,
                            brand,
                            price: list_price,
                            discount_price,
                            images: row.images.unwrap_or_default(),
                        })
                    }
                    _ => None,
                };
                OrderItemResponse {
                    product_id: row.product_id,
                    product,
                    size: row.size,
                    quantity: row.quantity,
                    price: row.price,
                    line_total: rust_decimal::Decimal::from(row.quantity) * row.price,
                }
            })
            .collect();

        Ok(OrderResponse {
            id: order.id,
            user_id: order.user_id,
            address: order.address(),
            items,
            subtotal: order.subtotal,
            coupon_code: order.coupon_code,
            discount_amount: order.discount_amount,
            payment_method: order.payment_method,
            delivery_option: order.delivery_option,
            shipping_fee: order.shipping_fee,
            total_amount: order.total_amount,
            status: order.status,
            razorpay_order_id: order.razorpay_order_id,
            razorpay_payment_id: order.razorpay_payment_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}
