//! User domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::UserId;

/// Account-level role. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Student => "student",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "student" => Ok(UserRole::Student),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A registered user as returned by the API. The password hash never leaves the
/// database layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    /// Institution-facing student number. Students only.
    pub student_id: Option<String>,
    /// Students only.
    pub enrollment_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Row used by login, carrying the stored hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithPassword {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub student_id: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<UserWithPassword> for User {
    fn from(row: UserWithPassword) -> Self {
        Self {
            id: row.id,
            email: row.email,
            role: row.role,
            student_id: row.student_id,
            enrollment_date: row.enrollment_date,
            created_at: row.created_at,
        }
    }
}
