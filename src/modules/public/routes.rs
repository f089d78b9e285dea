use axum::{routing::get, Router};

use crate::app_state::AppState;

use super::handlers::{cancel_by_token, confirm_by_token};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/enrollments/confirm/:token", get(confirm_by_token))
        .route("/enrollments/cancel/:token", get(cancel_by_token))
}
