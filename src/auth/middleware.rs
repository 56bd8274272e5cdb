// Authentication extractors for protected routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Authenticated user extractor for protected routes
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
    pub email: Option<String>,
    pub phone: Option<String>,
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

        let claims = TokenService::new(jwt_secret).validate_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            role: claims.role,
            email: claims.email,
            phone: claims.phone,
        })
    }
}

/// Extractor that additionally requires the admin role.
/// Used by catalog/coupon mutations and order status updates.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            return Err(AuthError::InsufficientPermissions {
                required: Role::Admin,
                actual: user.role,
            });
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::User;
    use axum::http::Request;
    use chrono::Utc;

    const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

    fn create_parts_with_auth(auth_value: &str) -> Parts {
        let req = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, auth_value)
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    fn create_parts_without_auth() -> Parts {
        let req = Request::builder().uri("/").body(()).unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: None,
            email: Some("someone@example.com".to_string()),
            password_hash: None,
            phone: None,
            role,
            blocked: false,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted() {
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let user = user_with_role(Role::User);
        let token = TokenService::new(TEST_SECRET.to_string())
            .generate_token(&user)
            .unwrap();
        let mut parts = create_parts_with_auth(&format!("Bearer {}", token));

        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        let authed = result.unwrap();
        assert_eq!(authed.user_id, user.id);
        assert_eq!(authed.role, Role::User);
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let mut parts = create_parts_without_auth();
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result.unwrap_err(), AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        for auth_value in ["InvalidFormat token", "token_without_bearer", "Basic dXNlcjpwYXNz"] {
            let mut parts = create_parts_with_auth(auth_value);
            let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
            assert!(result.is_err());
        }
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let mut parts = create_parts_with_auth("Bearer not.a.valid.jwt");
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_admin_gate_allows_admin() {
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let token = TokenService::new(TEST_SECRET.to_string())
            .generate_token(&user_with_role(Role::Admin))
            .unwrap();
        let mut parts = create_parts_with_auth(&format!("Bearer {}", token));

        assert!(AdminUser::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_gate_denies_customer() {
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let token = TokenService::new(TEST_SECRET.to_string())
            .generate_token(&user_with_role(Role::User))
            .unwrap();
        let mut parts = create_parts_with_auth(&format!("Bearer {}", token));

        let result = AdminUser::from_request_parts(&mut parts, &()).await;
        match result.unwrap_err() {
            AuthError::InsufficientPermissions { required, actual } => {
                assert_eq!(required, Role::Admin);
                assert_eq!(actual, Role::User);
            }
            other => panic!("Expected InsufficientPermissions, got {:?}", other),
        }
    }
}
