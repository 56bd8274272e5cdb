// Authentication module
// Admin email+password login and customer mobile OTP login, both issuing
// HS256 session tokens. OTP codes live in an injected expiring store.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{AdminUser, AuthenticatedUser};
pub use models::{AuthResponse, Role, User, UserResponse};
pub use otp::{generate_otp, InMemoryOtpStore, OtpStore, RedisOtpStore};
pub use service::AuthService;
