// Cart engine orchestration: loads state under the per-cart row lock,
// applies the pure mutation rules, writes the result back, and prices
// the cart for responses.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cart::error::CartError;
use crate::cart::models::{
    AddItemRequest, ApplyCouponRequest, CartItemResponse, CartResponse, RemoveItemRequest,
    UpdateQuantityRequest,
};
use crate::cart::repository::CartRepository;
use crate::coupons::repository::CouponRepository;
use crate::coupons::validator::{discount_amount, evaluate_coupon};
use crate::models::ProductSummary;

/// Service for cart business logic
#[derive(Clone)]
pub struct CartService {
    repo: CartRepository,
    coupons: CouponRepository,
}

impl CartService {
    pub fn new(repo: CartRepository, coupons: CouponRepository) -> Self {
        Self { repo, coupons }
    }

    /// Add an item to the user's cart, creating the cart lazily on the
    /// first add. An existing (product, size) line grows by exactly 1.
    pub async fn add_item(&self, request: &AddItemRequest) -> Result<CartResponse, CartError> {
        let mut tx = self.repo.pool().begin().await?;

        let cart = CartRepository::find_or_create_locked(&mut tx, request.user_id).await?;
        let mut state = CartRepository::load_state(&mut tx, &cart).await?;

        let unit_price = CartRepository::product_price(&mut tx, request.product_id)
            .await?
            .ok_or(CartError::ProductNotFound(request.product_id))?;

        state.add_item(request.product_id, &request.size, request.quantity, unit_price);

        CartRepository::save_state(&mut tx, cart.id, &state).await?;
        tx.commit().await?;

        tracing::debug!(
            "Added product {} ({}) to cart of user {}",
            request.product_id,
            request.size,
            request.user_id
        );
        self.get_cart(request.user_id).await
    }

    /// Apply a signed quantity delta to a line. Driving the quantity to
    /// zero or below removes the line; shrinking the total under the
    /// applied coupon's minimum purchase drops the coupon in the same
    /// transaction.
    pub async fn update_quantity(
        &self,
        request: &UpdateQuantityRequest,
    ) -> Result<CartResponse, CartError> {
        let mut tx = self.repo.pool().begin().await?;

        let cart = CartRepository::find_locked(&mut tx, request.user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;
        let mut state = CartRepository::load_state(&mut tx, &cart).await?;

        if !state.update_quantity(request.product_id, &request.size, request.quantity) {
            return Err(CartError::ItemNotFound);
        }

        CartRepository::save_state(&mut tx, cart.id, &state).await?;
        tx.commit().await?;

        self.get_cart(request.user_id).await
    }

    /// Remove a (product, size) line. A missing cart is not an error;
    /// the caller simply sees the empty cart.
    pub async fn remove_item(&self, request: &RemoveItemRequest) -> Result<CartResponse, CartError> {
        let mut tx = self.repo.pool().begin().await?;

        let Some(cart) = CartRepository::find_locked(&mut tx, request.user_id).await? else {
            return Ok(CartResponse::empty(request.user_id));
        };
        let mut state = CartRepository::load_state(&mut tx, &cart).await?;

        state.remove_item(request.product_id, &request.size);

        CartRepository::save_state(&mut tx, cart.id, &state).await?;
        tx.commit().await?;

        self.get_cart(request.user_id).await
    }

    /// Validate a coupon code against the current cart total and store
    /// its snapshot. Re-applying overwrites any previous coupon.
    pub async fn apply_coupon(&self, request: &ApplyCouponRequest) -> Result<CartResponse, CartError> {
        let mut tx = self.repo.pool().begin().await?;

        let cart = CartRepository::find_locked(&mut tx, request.user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;
        let mut state = CartRepository::load_state(&mut tx, &cart).await?;

        let coupon = self
            .coupons
            .find_by_code(&request.code)
            .await
            .map_err(|e| CartError::DatabaseError(e.to_string()))?;
        let snapshot = evaluate_coupon(coupon.as_ref(), state.total(), Utc::now())?;

        state.apply_coupon(snapshot);

        CartRepository::save_coupon(&mut tx, cart.id, state.applied_coupon.as_ref()).await?;
        tx.commit().await?;

        tracing::info!("Applied coupon to cart of user {}", request.user_id);
        self.get_cart(request.user_id).await
    }

    /// Drop any applied coupon
    pub async fn remove_coupon(&self, user_id: Uuid) -> Result<CartResponse, CartError> {
        let mut tx = self.repo.pool().begin().await?;

        let cart = CartRepository::find_locked(&mut tx, user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        CartRepository::save_coupon(&mut tx, cart.id, None).await?;
        tx.commit().await?;

        self.get_cart(user_id).await
    }

    /// Empty the cart: items and coupon both go, the row stays.
    pub async fn clear(&self, user_id: Uuid) -> Result<(), CartError> {
        let mut tx = self.repo.pool().begin().await?;
        CartRepository::clear_by_user(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::debug!("Cleared cart of user {}", user_id);
        Ok(())
    }

    /// Cart with resolved product details and computed pricing. Users
    /// without a cart get the empty shape, never a 404.
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartResponse, CartError> {
        let Some(cart) = self.repo.find_by_user(user_id).await? else {
            return Ok(CartResponse::empty(user_id));
        };

        let rows = self.repo.load_view_rows(cart.id).await?;

        let mut cart_total = Decimal::ZERO;
        let items: Vec<CartItemResponse> = rows
            .into_iter()
            .map(|row| {
                let line_total = Decimal::from(row.quantity) * row.discount_price;
                cart_total += line_total;
                CartItemResponse {
                    product: ProductSummary {
                        id: row.product_id,
                        title: row.title,
                        brand: row.brand,
                        price: row.price,
                        discount_price: row.discount_price,
                        images: row.images,
                    },
                    size: row.size,
                    quantity: row.quantity,
                    line_total,
                }
            })
            .collect();

        let applied_coupon = cart.coupon_snapshot();
        let discount = applied_coupon
            .as_ref()
            .map(|snapshot| discount_amount(snapshot, cart_total))
            .unwrap_or(Decimal::ZERO);

        Ok(CartResponse {
            user_id,
            items,
            applied_coupon,
            cart_total,
            discount_amount: discount,
            payable_total: cart_total - discount,
        })
    }
}
