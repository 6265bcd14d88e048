//! Classroom registry models and DTOs.

use chrono::{DateTime, Utc};
use rollcall_core::serde::deserialize_optional_trimmed;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::ids::{ClassroomId, UserId};

/// Length of a generated join code.
pub const JOIN_CODE_LEN: usize = 6;

/// Role of a user inside one classroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "classroom_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClassroomRole {
    Admin,
    Student,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "K7Q2ZD")]
    pub join_code: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// One entry of a classroom's member list, in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassroomMember {
    pub user_id: UserId,
    pub email: String,
    pub role: ClassroomRole,
    pub joined_at: DateTime<Utc>,
}

/// Classroom as listed for a member.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassroomSummary {
    pub id: ClassroomId,
    pub name: String,
    pub description: Option<String>,
    pub join_code: String,
    pub created_by: UserId,
    pub creator_email: String,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Classroom with its full member list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassroomDetail {
    #[serde(flatten)]
    pub classroom: Classroom,
    pub creator_email: String,
    pub members: Vec<ClassroomMember>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassroomDto {
    #[validate(
        custom(function = "validate_not_blank", message = "Name is required"),
        length(max = 100, message = "Name must be at most 100 characters")
    )]
    #[schema(example = "Math")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct JoinClassroomDto {
    #[serde(alias = "joinCode")]
    #[validate(length(min = 1, message = "Join code is required"))]
    #[schema(example = "K7Q2ZD")]
    pub join_code: String,
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Whether `code` has the shape of a generated join code.
pub fn is_valid_join_code(code: &str) -> bool {
    code.len() == JOIN_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
