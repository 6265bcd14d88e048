use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{list_marks, mark_attendance};

#[allow(deprecated)]
pub fn init_legacy_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/{classroom_id}", get(list_marks))
        .route("/{classroom_id}/mark", post(mark_attendance))
}
