//! Classroom models, re-exported from the `rollcall-models` crate.

pub use rollcall_models::classrooms::*;
