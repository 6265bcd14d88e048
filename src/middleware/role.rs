//! Role checks for authenticated requests.
//!
//! Roles come from the token, so they reflect the account at login time. Users
//! cannot change role, which keeps the claim authoritative for the token's lifetime.

use axum::{extract::FromRequestParts, http::request::Parts};

use rollcall_core::AppError;
use rollcall_models::UserRole;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Parses the role claim. An unknown role means the token was not issued by us.
pub fn parse_role_from_string(role: &str) -> Result<UserRole, AppError> {
    role.parse()
        .map_err(|_| AppError::invalid_token("Invalid or expired token"))
}

/// Fails with 403 unless `role` is one of `allowed`.
pub fn ensure_role(role: UserRole, allowed: &[UserRole], message: &str) -> Result<(), AppError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AppError::forbidden(message))
    }
}

/// Extractor that only admits admins.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        ensure_role(auth_user.role()?, &[UserRole::Admin], "Admin access required")?;

        Ok(RequireAdmin(auth_user))
    }
}
