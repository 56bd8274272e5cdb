// Coupon catalog and the pure validator the cart engine evaluates
// coupons against.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod validator;

pub use models::*;
pub use repository::CouponRepository;
pub use validator::{discount_amount, evaluate_coupon, CouponRejection};
