use std::env;

/// Tokens are valid for one day unless `JWT_ACCESS_EXPIRY` says otherwise.
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 86_400;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ACCESS_TOKEN_EXPIRY),
        }
    }
}
