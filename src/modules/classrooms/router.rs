use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_classroom, get_classroom, join_classroom, list_classrooms};

pub fn init_classrooms_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_classroom).get(list_classrooms))
        .route("/join", post(join_classroom))
        .route("/{id}", get(get_classroom))
}
