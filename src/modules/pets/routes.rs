use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{create_pet, get_pet, list_pets_for_tutor};

pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_pet))
        .route("/:id", get(get_pet))
        .route("/tutor/:tutor_id", get(list_pets_for_tutor))
}
