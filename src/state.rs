use rollcall_config::{CorsConfig, JwtConfig, ServerConfig};
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub server_config: ServerConfig,
}

impl AppState {
    /// Builds state around an existing pool, reading the rest from the environment.
    pub fn from_env(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            server_config: ServerConfig::from_env(),
        }
    }
}
