pub mod attendance;
pub mod auth;
pub mod classrooms;
pub mod legacy_attendance;
