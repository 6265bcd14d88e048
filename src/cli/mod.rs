//! Administrative commands behind the `rollcall-cli` binary.

pub mod seeder;

use anyhow::anyhow;
use sqlx::PgPool;
use validator::Validate;

use rollcall_core::{AppError, hash_password};
use rollcall_models::ids::UserId;
use rollcall_models::{RegisterRequest, UserRole};

/// Creates an admin account outside the HTTP API, applying the same rules as
/// registration.
pub async fn create_admin(db: &PgPool, email: &str, password: &str) -> Result<UserId, AppError> {
    let dto = RegisterRequest {
        email: email.trim().to_lowercase(),
        password: password.to_string(),
        role: UserRole::Admin,
        student_id: None,
        enrollment_date: None,
    };
    dto.validate()
        .map_err(|e| AppError::bad_request(anyhow!("{}", e)))?;

    let hashed_password = hash_password(&dto.password)?;

    sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (email, password, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&dto.email)
    .bind(&hashed_password)
    .bind(UserRole::Admin)
    .fetch_one(db)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e
            && db_err.is_unique_violation()
        {
            return AppError::conflict("User with this email already exists");
        }
        AppError::from(e)
    })
}
