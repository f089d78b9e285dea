use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{cancel_enrollment, check_in, enroll, get_enrollment, mark_no_show};

pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(enroll))
        .route("/:id", get(get_enrollment))
        .route("/:id/cancel", post(cancel_enrollment))
        .route("/:id/check-in", post(check_in))
        .route("/:id/no-show", post(mark_no_show))
}
