//! # Rollcall Core
//!
//! Core types, errors, and utilities for the Rollcall API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use rollcall_core::{AppError, hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Classroom not found"));
//!
//! let hash = hash_password("secret1")?;
//! assert!(verify_password("secret1", &hash)?);
//! ```

pub mod errors;
pub mod password;
pub mod serde;

pub use errors::{AppError, set_expose_internal_errors};
pub use password::{hash_password, hash_password_with_cost, verify_password};
