use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    create_package, create_purchase, get_package, list_packages_for_company,
    list_purchases_for_tutor,
};

pub fn package_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_package))
        .route("/:id", get(get_package))
        .route("/company/:company_id", get(list_packages_for_company))
}

pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase))
        .route("/tutor/:tutor_id", get(list_purchases_for_tutor))
}
