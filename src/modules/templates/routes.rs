use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    create_template, generate_sessions, get_template, list_templates_for_trainer,
    set_template_status,
};

pub fn template_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_template))
        .route("/:id", get(get_template))
        .route("/:id/status", post(set_template_status))
        .route("/:id/generate", post(generate_sessions))
        .route("/trainer/:trainer_id", get(list_templates_for_trainer))
}
