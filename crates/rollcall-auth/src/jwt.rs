//! Access token creation and verification.
//!
//! Tokens are HS256-signed with the configured secret and expire after
//! [`JwtConfig::access_token_expiry`] seconds. There are no refresh tokens: once a
//! token expires the client logs in again.
//!
//! # Example
//!
//! ```ignore
//! use rollcall_auth::{create_access_token, verify_token};
//! use rollcall_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "t@x.com", "admin", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, "admin");
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use rollcall_config::JwtConfig;
use rollcall_core::AppError;

use crate::claims::Claims;

/// Creates a signed access token for the given identity.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies the signature and expiry of an access token.
///
/// # Errors
///
/// Returns an invalid-token error (403) for bad signatures, malformed input and
/// expired tokens alike.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::invalid_token("Invalid or expired token"))
}
