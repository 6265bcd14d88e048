//! Extractors for authentication and authorization.
//!
//! - [`auth`]: [`auth::AuthUser`] validates the bearer token and exposes its claims
//! - [`role`]: account-role checks on top of [`auth::AuthUser`]
//!
//! Missing or malformed `Authorization` headers are rejected with 401, tokens that
//! fail verification with 403. Role failures are 403 as well.
//!
//! ```ignore
//! use crate::middleware::{auth::AuthUser, role::RequireAdmin};
//!
//! async fn list(auth_user: AuthUser) -> impl IntoResponse { /* any signed-in user */ }
//!
//! async fn start(RequireAdmin(auth_user): RequireAdmin) -> impl IntoResponse {
//!     /* admins only */
//! }
//! ```

pub mod auth;
pub mod role;
