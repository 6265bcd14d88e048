use anyhow::anyhow;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use rollcall_core::AppError;
use rollcall_models::ids::{AttendanceSessionId, ClassroomId};

use crate::middleware::{auth::AuthUser, role::RequireAdmin};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedPath;

use super::model::{AttendanceRecord, AttendanceSession, HistoryFilterParams, SessionWithRecords};
use super::service::AttendanceService;

#[utoipa::path(
    post,
    path = "/api/attendance/session/start/{classroom_id}",
    params(
        ("classroom_id" = Uuid, Path, description = "Classroom ID")
    ),
    responses(
        (status = 201, description = "Session started", body = AttendanceSession),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse),
        (status = 409, description = "A session is already active", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn start_session(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    ValidatedPath(classroom_id): ValidatedPath<ClassroomId>,
) -> Result<(StatusCode, Json<AttendanceSession>), AppError> {
    let session = AttendanceService::start_session(
        &state.db,
        classroom_id,
        auth_user.user_id()?,
        auth_user.role()?,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    post,
    path = "/api/attendance/session/{session_id}/end",
    params(
        ("session_id" = Uuid, Path, description = "Attendance session ID")
    ),
    responses(
        (status = 200, description = "Session ended", body = AttendanceSession),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Session already ended", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn end_session(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    ValidatedPath(session_id): ValidatedPath<AttendanceSessionId>,
) -> Result<Json<AttendanceSession>, AppError> {
    let session = AttendanceService::end_session(&state.db, session_id, auth_user.role()?).await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/attendance/session/{session_id}/mark",
    params(
        ("session_id" = Uuid, Path, description = "Attendance session ID")
    ),
    responses(
        (status = 201, description = "Marked present", body = AttendanceRecord),
        (status = 400, description = "Session has ended", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not a student member of the classroom", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Already marked", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_present(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(session_id): ValidatedPath<AttendanceSessionId>,
) -> Result<(StatusCode, Json<AttendanceRecord>), AppError> {
    let record = AttendanceService::mark_present(
        &state.db,
        session_id,
        auth_user.user_id()?,
        auth_user.role()?,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Active session of a classroom, or `null`. Clients poll this.
#[utoipa::path(
    get,
    path = "/api/attendance/session/active/{classroom_id}",
    params(
        ("classroom_id" = Uuid, Path, description = "Classroom ID")
    ),
    responses(
        (status = 200, description = "Active session with records, or null", body = Option<SessionWithRecords>),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_active_session(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedPath(classroom_id): ValidatedPath<ClassroomId>,
) -> Result<Json<Option<SessionWithRecords>>, AppError> {
    let session = AttendanceService::get_active_session(&state.db, classroom_id).await?;
    Ok(Json(session))
}

#[utoipa::path(
    get,
    path = "/api/attendance/session/records/{classroom_id}",
    params(
        ("classroom_id" = Uuid, Path, description = "Classroom ID"),
        HistoryFilterParams
    ),
    responses(
        (status = 200, description = "Sessions with records, most recent first", body = Vec<SessionWithRecords>),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not an admin or member", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, filters))]
pub async fn list_session_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(classroom_id): ValidatedPath<ClassroomId>,
    filters: Result<Query<HistoryFilterParams>, QueryRejection>,
) -> Result<Json<Vec<SessionWithRecords>>, AppError> {
    let Query(filters) = filters
        .map_err(|e| AppError::bad_request(anyhow!("Invalid query parameters: {}", e)))?;
    let day = filters
        .day()
        .map_err(|_| AppError::bad_request(anyhow!("Invalid date, expected YYYY-MM-DD")))?;

    let sessions = AttendanceService::list_session_history(
        &state.db,
        classroom_id,
        auth_user.user_id()?,
        auth_user.role()?,
        day,
    )
    .await?;
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/api/attendance/session/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Attendance session ID")
    ),
    responses(
        (status = 200, description = "Session with records", body = SessionWithRecords),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Not found or not visible to the caller", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(session_id): ValidatedPath<AttendanceSessionId>,
) -> Result<Json<SessionWithRecords>, AppError> {
    let session = AttendanceService::get_session(
        &state.db,
        session_id,
        auth_user.user_id()?,
        auth_user.role()?,
    )
    .await?;
    Ok(Json(session))
}
