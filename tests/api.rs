mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::types::Uuid;
use tower::ServiceExt;

use common::test_pool;
use pawsched::app::create_router;
use pawsched::app_state::AppState;
use pawsched::config::{AppConfig, Config, DatabaseConfig, Environment, SchedulingConfig, ServerConfig};
use pawsched::notify::Notifier;

async fn test_app() -> axum::Router {
    let pool = test_pool().await;
    let env = Config {
        server: ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: Some(1),
        },
        scheduling: SchedulingConfig {
            cancellation_cutoff_hours: 24,
            sweep_interval_secs: 60,
        },
        app: AppConfig {
            name: "Pawsched".into(),
            environment: Environment::Development,
        },
    };
    create_router(AppState::new(pool, env, Notifier::default()))
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["services"]["database"], "healthy");
}

#[tokio::test]
async fn availability_config_round_trips_over_http() {
    let app = test_app().await;
    let trainer = Uuid::new_v4();

    let payload = serde_json::json!({
        "company_id": Uuid::new_v4(),
        "work_start": "09:00:00",
        "work_end": "17:00:00",
        "slot_duration_minutes": 60,
        "lunch_break_start": "12:00:00",
        "lunch_break_end": "13:00:00",
        "working_days": ["mon", "wed", "fri"],
        "timezone": "Europe/Berlin"
    });
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/availability/{trainer}"), payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["working_days"], "mon,wed,fri");
    assert_eq!(created["advance_booking_days"], 30);

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/availability/{trainer}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["timezone"], "Europe/Berlin");
}

#[tokio::test]
async fn unknown_trainer_config_is_404() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::get(format!("/availability/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_break_window_is_rejected() {
    let app = test_app().await;
    let trainer = Uuid::new_v4();

    // Lunch break outside the work window.
    let payload = serde_json::json!({
        "company_id": Uuid::new_v4(),
        "work_start": "09:00:00",
        "work_end": "12:00:00",
        "slot_duration_minutes": 60,
        "lunch_break_start": "13:00:00",
        "lunch_break_end": "14:00:00",
        "working_days": ["mon"],
        "timezone": "UTC"
    });
    let response = app
        .oneshot(json_request("PUT", &format!("/availability/{trainer}"), payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn weekly_template_requires_weekdays() {
    let app = test_app().await;
    let payload = serde_json::json!({
        "company_id": Uuid::new_v4(),
        "package_id": Uuid::new_v4(),
        "trainer_id": Uuid::new_v4(),
        "start_time": "10:00:00",
        "end_time": "11:00:00",
        "max_participants": 6,
        "recurrence": "weekly",
        "start_date": "2025-01-06",
        "end_date": "2025-03-31"
    });
    let response = app
        .oneshot(json_request("POST", "/templates", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn enrolling_into_a_missing_session_is_404() {
    let app = test_app().await;
    let payload = serde_json::json!({
        "company_id": Uuid::new_v4(),
        "training_session_id": Uuid::new_v4(),
        "tutor_id": Uuid::new_v4(),
        "pet_id": Uuid::new_v4(),
    });
    let response = app
        .oneshot(json_request("POST", "/enrollments", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_public_token_is_404() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::get(format!("/public/enrollments/confirm/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
