use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    create_session, get_session, get_session_by_key, list_session_enrollments, list_sessions,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session).get(list_sessions))
        .route("/:id", get(get_session))
        .route("/:id/enrollments", get(list_session_enrollments))
        .route("/key/:session_key", get(get_session_by_key))
}
