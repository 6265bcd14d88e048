//! # Rollcall Models
//!
//! Domain models and DTOs for the Rollcall API: database rows, request bodies with
//! their `validator` rules, and the response shapes documented through `utoipa`.
//!
//! # Modules
//!
//! - [`ids`]: typed UUID wrappers
//! - [`users`]: users and account roles
//! - [`auth`]: registration and login
//! - [`classrooms`]: classrooms, members and join codes
//! - [`attendance`]: sessions, records and legacy marks

pub mod attendance;
pub mod auth;
pub mod classrooms;
pub mod ids;
pub mod users;

pub use auth::{AuthResponse, Claims, LoginRequest, RegisterRequest, default_student_id};

pub use users::{User, UserRole, UserWithPassword};

pub use classrooms::{
    Classroom, ClassroomDetail, ClassroomMember, ClassroomRole, ClassroomSummary,
    CreateClassroomDto, JOIN_CODE_LEN, JoinClassroomDto, is_valid_join_code, validate_not_blank,
};

pub use attendance::{
    AttendanceMark, AttendanceRecord, AttendanceRecordRow, AttendanceRecordWithStudent,
    AttendanceSession, AttendanceStatus, HistoryFilterParams, LegacyMarkDto, SessionStatus,
    SessionWithRecords, StudentInfo, parse_day, utc_day_bounds,
};
