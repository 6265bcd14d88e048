use anyhow::anyhow;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use rollcall_core::AppError;
use rollcall_models::ids::ClassroomId;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

use super::model::{AttendanceMark, HistoryFilterParams, LegacyMarkDto};
use super::service::LegacyAttendanceService;

/// Mark attendance directly on a classroom (deprecated, use sessions)
#[utoipa::path(
    post,
    path = "/api/attendance/classroom/{classroom_id}/mark",
    params(
        ("classroom_id" = Uuid, Path, description = "Classroom ID")
    ),
    request_body = LegacyMarkDto,
    responses(
        (status = 201, description = "Mark recorded", body = AttendanceMark),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Not found or not a member", body = ErrorResponse)
    ),
    tag = "Legacy Attendance",
    security(("bearer_auth" = []))
)]
#[deprecated(note = "use attendance sessions")]
#[instrument(skip(state, auth_user, dto))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(classroom_id): ValidatedPath<ClassroomId>,
    ValidatedJson(dto): ValidatedJson<LegacyMarkDto>,
) -> Result<(StatusCode, Json<AttendanceMark>), AppError> {
    let mark =
        LegacyAttendanceService::mark(&state.db, classroom_id, auth_user.user_id()?, dto.status)
            .await?;
    Ok((StatusCode::CREATED, Json(mark)))
}

/// Direct marks of a classroom, newest first (deprecated, use sessions)
#[utoipa::path(
    get,
    path = "/api/attendance/classroom/{classroom_id}",
    params(
        ("classroom_id" = Uuid, Path, description = "Classroom ID"),
        HistoryFilterParams
    ),
    responses(
        (status = 200, description = "Marks", body = Vec<AttendanceMark>),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Not found or not a member", body = ErrorResponse)
    ),
    tag = "Legacy Attendance",
    security(("bearer_auth" = []))
)]
#[deprecated(note = "use attendance sessions")]
#[instrument(skip(state, auth_user, filters))]
pub async fn list_marks(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(classroom_id): ValidatedPath<ClassroomId>,
    filters: Result<Query<HistoryFilterParams>, QueryRejection>,
) -> Result<Json<Vec<AttendanceMark>>, AppError> {
    let Query(filters) = filters
        .map_err(|e| AppError::bad_request(anyhow!("Invalid query parameters: {}", e)))?;
    let day = filters
        .day()
        .map_err(|_| AppError::bad_request(anyhow!("Invalid date, expected YYYY-MM-DD")))?;

    let marks =
        LegacyAttendanceService::list(&state.db, classroom_id, auth_user.user_id()?, day).await?;
    Ok(Json(marks))
}
