// Cart module: per-user cart state with at most one applied coupon.
//
// The mutation rules live in `engine` as pure functions over in-memory
// state; `repository` persists that state inside row-locked
// transactions so concurrent mutations to the same cart serialize;
// `service` wires the two together with the coupon validator.

pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use engine::{CartLine, CartState};
pub use error::CartError;
pub use models::*;
pub use repository::CartRepository;
pub use service::CartService;
