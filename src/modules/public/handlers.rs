use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Uuid;

use crate::app_state::AppState;
use crate::db::models::TrainingSessionEnrollment;
use crate::error::AppResult;
use crate::notify::SchedulingEvent;
use crate::scheduling::EnrollmentLifecycle;

#[derive(Debug, Default, Deserialize)]
pub struct CancelQuery {
    pub reason: Option<String>,
}

/// Email-link confirmation. No authentication: possession of the token is
/// the capability. Clicking the link twice is harmless.
pub async fn confirm_by_token(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> AppResult<Json<TrainingSessionEnrollment>> {
    let enrollment = EnrollmentLifecycle::confirm_by_token(&state.db, token, Utc::now()).await?;

    state
        .notifier
        .dispatch(SchedulingEvent::EnrollmentConfirmed {
            enrollment_id: enrollment.id,
            training_session_id: enrollment.training_session_id,
        });
    Ok(Json(enrollment))
}

/// Email-link cancellation, subject to the same window rules as an
/// authenticated cancel.
pub async fn cancel_by_token(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Query(query): Query<CancelQuery>,
) -> AppResult<Json<TrainingSessionEnrollment>> {
    let enrollment =
        EnrollmentLifecycle::cancel_by_token(&state.db, state.policy(), token, query.reason, Utc::now())
            .await?;

    state
        .notifier
        .dispatch(SchedulingEvent::EnrollmentCancelled {
            enrollment_id: enrollment.id,
            training_session_id: enrollment.training_session_id,
            reason: enrollment.cancellation_reason.clone(),
        });
    Ok(Json(enrollment))
}
