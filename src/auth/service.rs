// Authentication service - business logic layer

use std::sync::Arc;

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, Role, UserResponse},
    otp::{generate_otp, OtpStore, OTP_TTL},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};

/// Authentication service coordinating both login schemes:
/// email+password for admins, mobile OTP for customers.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    otp_store: Arc<dyn OtpStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: UserRepository, otp_store: Arc<dyn OtpStore>, tokens: TokenService) -> Self {
        Self {
            users,
            otp_store,
            tokens,
        }
    }

    /// Admin login with email and password.
    /// Password login is refused for non-admin roles and blocked accounts.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.role != Role::Admin {
            return Err(AuthError::AdminOnly);
        }
        if user.blocked {
            return Err(AuthError::AccountBlocked);
        }

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !PasswordService::verify_password(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.generate_token(&user)?;
        self.users.touch_last_login(user.id).await?;

        tracing::info!("Admin login successful for user {}", user.id);
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Issue a one-time code for a phone number. The code is stored with
    /// a 5-minute TTL and delivered out-of-band (logged in development).
    pub async fn send_otp(&self, phone: &str) -> Result<(), AuthError> {
        if let Some(user) = self.users.find_by_phone(phone).await? {
            if user.blocked {
                return Err(AuthError::AccountBlocked);
            }
        }

        let otp = generate_otp();
        self.otp_store.put(phone, &otp, OTP_TTL).await?;

        // SMS gateway integration is environment-specific; development
        // builds surface the code in the log instead.
        tracing::info!("OTP for {}: {}", phone, otp);
        Ok(())
    }

    /// Verify a one-time code. The stored code is consumed on read, so a
    /// second attempt with the same code fails. A first-time phone number
    /// becomes a customer account only after the code checks out.
    pub async fn verify_otp(&self, phone: &str, otp: &str) -> Result<AuthResponse, AuthError> {
        let stored = self
            .otp_store
            .take_once(phone)
            .await?
            .ok_or(AuthError::OtpNotRequested)?;

        if stored != otp {
            return Err(AuthError::InvalidOtp);
        }

        let user = match self.users.find_by_phone(phone).await? {
            Some(user) => user,
            None => {
                let user = self.users.create_customer(phone).await?;
                tracing::info!("Registered new customer {} after OTP", user.id);
                user
            }
        };

        if user.blocked {
            return Err(AuthError::AccountBlocked);
        }

        let token = self.tokens.generate_token(&user)?;
        self.users.touch_last_login(user.id).await?;

        tracing::info!("OTP login successful for user {}", user.id);
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Block or unblock an account (admin operation)
    pub async fn set_blocked(
        &self,
        user_id: uuid::Uuid,
        blocked: bool,
    ) -> Result<UserResponse, AuthError> {
        let user = self.users.set_blocked(user_id, blocked).await?;
        tracing::info!(
            "User {} {}",
            user.id,
            if blocked { "blocked" } else { "unblocked" }
        );
        Ok(user.into())
    }
}
