use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use rollcall_auth::create_access_token;
use rollcall_config::JwtConfig;
use rollcall_core::{AppError, hash_password, verify_password};
use rollcall_models::ids::UserId;

use crate::metrics;

use super::model::{AuthResponse, LoginRequest, RegisterRequest, User, UserWithPassword};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(user.email = %dto.email, user.role = %dto.role))]
    pub async fn register_user(
        db: &PgPool,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&dto.email);
        let (student_id, enrollment_date) = dto.student_fields();
        let hashed_password = hash_password(&dto.password)?;

        // The unique constraint decides duplicates, so concurrent registrations
        // with the same email cannot both succeed.
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password, role, student_id, enrollment_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, email, role, student_id, enrollment_date, created_at",
        )
        .bind(&email)
        .bind(&hashed_password)
        .bind(dto.role)
        .bind(&student_id)
        .bind(enrollment_date)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(user.email = %email, "Registration with existing email");
                return AppError::conflict("Email already registered");
            }
            error!(error = %e, "Database error registering user");
            AppError::from(e)
        })?;

        let token = create_access_token(
            user.id.into_inner(),
            &user.email,
            user.role.as_str(),
            jwt_config,
        )?;

        metrics::track_user_registered(user.role.as_str());
        info!(user.id = %user.id, "User registered");

        Ok(AuthResponse { user, token })
    }

    #[instrument(skip(db, dto, jwt_config), fields(user.email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&dto.email);

        let Some(row) = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, email, password, role, student_id, enrollment_date, created_at
             FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(db)
        .await?
        else {
            debug!("Login for unknown email");
            metrics::track_login_failure();
            return Err(AppError::bad_request(anyhow!(INVALID_CREDENTIALS)));
        };

        if !verify_password(&dto.password, &row.password)? {
            debug!(user.id = %row.id, "Login with wrong password");
            metrics::track_login_failure();
            return Err(AppError::bad_request(anyhow!(INVALID_CREDENTIALS)));
        }

        let user = User::from(row);
        let token = create_access_token(
            user.id.into_inner(),
            &user.email,
            user.role.as_str(),
            jwt_config,
        )?;

        metrics::track_login_success(user.role.as_str());
        info!(user.id = %user.id, "User logged in");

        Ok(AuthResponse { user, token })
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, user_id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, role, student_id, enrollment_date, created_at
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
