use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;

use rollcall_core::AppError;
use rollcall_models::ids::ClassroomId;

use crate::middleware::{auth::AuthUser, role::RequireAdmin};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

use super::model::{ClassroomDetail, ClassroomSummary, CreateClassroomDto, JoinClassroomDto};
use super::service::ClassroomService;

#[utoipa::path(
    post,
    path = "/api/classrooms",
    request_body = CreateClassroomDto,
    responses(
        (status = 201, description = "Classroom created, creator enrolled as admin", body = ClassroomDetail),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 409, description = "No unique join code could be generated", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_classroom(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateClassroomDto>,
) -> Result<(StatusCode, Json<ClassroomDetail>), AppError> {
    let classroom =
        ClassroomService::create_classroom(&state.db, auth_user.user_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

#[utoipa::path(
    get,
    path = "/api/classrooms",
    responses(
        (status = 200, description = "Classrooms the caller belongs to, newest first", body = Vec<ClassroomSummary>),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn list_classrooms(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ClassroomSummary>>, AppError> {
    let classrooms =
        ClassroomService::list_classrooms_for_user(&state.db, auth_user.user_id()?).await?;
    Ok(Json(classrooms))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/{id}",
    params(
        ("id" = Uuid, Path, description = "Classroom ID")
    ),
    responses(
        (status = 200, description = "Classroom with members", body = ClassroomDetail),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Not found or not a member", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_classroom(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(id): ValidatedPath<ClassroomId>,
) -> Result<Json<ClassroomDetail>, AppError> {
    let classroom = ClassroomService::get_classroom(&state.db, id, auth_user.user_id()?).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    post,
    path = "/api/classrooms/join",
    request_body = JoinClassroomDto,
    responses(
        (status = 200, description = "Joined as student", body = ClassroomDetail),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Invalid join code", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn join_classroom(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<JoinClassroomDto>,
) -> Result<Json<ClassroomDetail>, AppError> {
    let classroom = ClassroomService::join_classroom(&state.db, auth_user.user_id()?, dto).await?;
    Ok(Json(classroom))
}
