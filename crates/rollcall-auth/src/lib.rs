//! # Rollcall Auth
//!
//! Authentication types and JWT utilities for the Rollcall API.
//!
//! - [`claims`]: the access token claim set
//! - [`jwt`]: token creation and verification
//!
//! Callers present tokens as `Authorization: Bearer <token>`. A missing token is a
//! 401; a token that fails [`verify_token`] is a 403.

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
