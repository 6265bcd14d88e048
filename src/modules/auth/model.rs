//! Authentication models, re-exported from the `rollcall-models` crate.

pub use rollcall_models::auth::*;
pub use rollcall_models::users::{User, UserRole, UserWithPassword};
