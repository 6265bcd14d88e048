//! # Rollcall Config
//!
//! Configuration types for the Rollcall API, loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and lifetime (`JWT_SECRET`, `JWT_ACCESS_EXPIRY`)
//! - [`cors`]: allowed browser origins (`ALLOWED_ORIGINS`)
//! - [`server`]: listen address and environment (`HOST`, `PORT`, `APP_ENV`)
//!
//! # Example
//!
//! ```ignore
//! use rollcall_config::{CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::{Environment, ServerConfig};
