//! Registration and login DTOs.

use chrono::NaiveDate;
use rollcall_core::serde::deserialize_optional_trimmed;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::{User, UserRole};

pub use rollcall_auth::Claims;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "teacher@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret123")]
    pub password: String,
    pub role: UserRole,
    /// Defaults to the local part of the email for students. Ignored for admins.
    #[serde(default, alias = "studentId", deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(max = 64, message = "Student id must be at most 64 characters"))]
    pub student_id: Option<String>,
    /// Ignored for admins.
    #[serde(default, alias = "enrollmentDate")]
    pub enrollment_date: Option<NaiveDate>,
}

impl RegisterRequest {
    /// The student-only fields as they should be stored for this role.
    pub fn student_fields(&self) -> (Option<String>, Option<NaiveDate>) {
        match self.role {
            UserRole::Admin => (None, None),
            UserRole::Student => (
                Some(
                    self.student_id
                        .clone()
                        .unwrap_or_else(|| default_student_id(&self.email)),
                ),
                self.enrollment_date,
            ),
        }
    }
}

/// The part of an email address before the `@`.
pub fn default_student_id(email: &str) -> String {
    email
        .split_once('@')
        .map(|(local, _)| local)
        .unwrap_or(email)
        .to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Returned by both register and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
