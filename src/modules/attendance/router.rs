use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    end_session, get_active_session, get_session, list_session_history, mark_present,
    start_session,
};

pub fn init_attendance_session_router() -> Router<AppState> {
    Router::new()
        .route("/start/{classroom_id}", post(start_session))
        .route("/active/{classroom_id}", get(get_active_session))
        .route("/records/{classroom_id}", get(list_session_history))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/end", post(end_session))
        .route("/{session_id}/mark", post(mark_present))
}
