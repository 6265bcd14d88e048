use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use rollcall_auth::verify_token;
use rollcall_core::AppError;
use rollcall_models::{Claims, UserRole, ids::UserId};

use crate::middleware::role::parse_role_from_string;
use crate::state::AppState;

const AUTH_REQUIRED: &str = "Authentication required";

/// Extractor that validates the bearer token and provides the caller's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::invalid_token("Invalid or expired token"))
    }

    pub fn role(&self) -> Result<UserRole, AppError> {
        parse_role_from_string(&self.0.role)
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized(AUTH_REQUIRED))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}
