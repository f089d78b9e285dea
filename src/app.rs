use axum::{middleware, routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    middleware::tracing::observability_middleware,
    modules::{
        availability::routes::availability_routes, enrollments::routes::enrollment_routes,
        packages::routes::{package_routes, purchase_routes}, pets::routes::pet_routes,
        public::routes::public_routes, sessions::routes::session_routes,
        templates::routes::template_routes,
    },
    websocket::websocket_routes,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .nest("/availability", availability_routes())
        .nest("/templates", template_routes())
        .nest("/sessions", session_routes())
        .nest("/enrollments", enrollment_routes())
        .nest("/packages", package_routes())
        .nest("/purchases", purchase_routes())
        .nest("/pets", pet_routes())
        .nest("/public", public_routes())
        .merge(websocket_routes())
        .layer(middleware::from_fn(observability_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Pawsched says woof!\n"
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
        }
    }))
}
