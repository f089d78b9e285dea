use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    delete_config, delete_exception, get_config, get_free_slots, get_working_window,
    upsert_config, upsert_exception,
};

pub fn availability_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:trainer_id",
            put(upsert_config).get(get_config).delete(delete_config),
        )
        .route("/:trainer_id/window", get(get_working_window))
        .route("/:trainer_id/slots", get(get_free_slots))
        .route("/:trainer_id/exceptions", put(upsert_exception))
        .route("/:trainer_id/exceptions/:date", delete(delete_exception))
}
