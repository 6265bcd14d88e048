use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use rollcall_models::{
    AttendanceMark, AttendanceRecord, AttendanceRecordWithStudent, AttendanceSession,
    AttendanceStatus, AuthResponse, Classroom, ClassroomDetail, ClassroomMember, ClassroomRole,
    ClassroomSummary, CreateClassroomDto, JoinClassroomDto, LegacyMarkDto, LoginRequest,
    RegisterRequest, SessionStatus, SessionWithRecords, StudentInfo, User, UserRole,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_me,
        crate::modules::classrooms::controller::create_classroom,
        crate::modules::classrooms::controller::list_classrooms,
        crate::modules::classrooms::controller::get_classroom,
        crate::modules::classrooms::controller::join_classroom,
        crate::modules::attendance::controller::start_session,
        crate::modules::attendance::controller::end_session,
        crate::modules::attendance::controller::mark_present,
        crate::modules::attendance::controller::get_active_session,
        crate::modules::attendance::controller::list_session_history,
        crate::modules::attendance::controller::get_session,
        crate::modules::legacy_attendance::controller::mark_attendance,
        crate::modules::legacy_attendance::controller::list_marks,
    ),
    components(
        schemas(
            User,
            UserRole,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            Classroom,
            ClassroomRole,
            ClassroomMember,
            ClassroomSummary,
            ClassroomDetail,
            CreateClassroomDto,
            JoinClassroomDto,
            AttendanceSession,
            SessionStatus,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceRecordWithStudent,
            StudentInfo,
            SessionWithRecords,
            LegacyMarkDto,
            AttendanceMark,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and the current user"),
        (name = "Classrooms", description = "Classroom creation, listing and joining by code"),
        (name = "Attendance", description = "Attendance sessions and presence records"),
        (name = "Legacy Attendance", description = "Deprecated direct per-classroom marks")
    ),
    info(
        title = "Rollcall API",
        version = "0.1.0",
        description = "Classroom attendance tracking: admins run attendance sessions, students join classrooms by code and mark themselves present.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_routes_are_deprecated() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        let legacy = &doc["paths"]["/api/attendance/classroom/{classroom_id}/mark"]["post"];
        assert_eq!(legacy["deprecated"], true);

        let current = &doc["paths"]["/api/attendance/session/{session_id}/mark"]["post"];
        assert!(current.get("deprecated").is_none() || current["deprecated"] == false);
    }
}
