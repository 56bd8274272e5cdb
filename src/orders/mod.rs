// Orders module: immutable order records assembled at checkout.
// Only the status ever changes after creation, and only along the
// transition table in `status_machine`.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod status_machine;

pub use error::OrderError;
pub use models::*;
pub use repository::OrdersRepository;
pub use service::OrderService;
pub use status_machine::StatusMachine;
