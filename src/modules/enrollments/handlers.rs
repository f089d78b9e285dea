use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use sqlx::types::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{
    CancelActor, CancelEnrollment, NewEnrollment, TrainingSessionEnrollment,
};
use crate::db::repositories::EnrollmentRepository;
use crate::error::{AppError, AppResult};
use crate::notify::SchedulingEvent;
use crate::scheduling::EnrollmentLifecycle;

pub async fn enroll(
    State(state): State<AppState>,
    Json(payload): Json<NewEnrollment>,
) -> AppResult<Json<TrainingSessionEnrollment>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let enrollment =
        EnrollmentLifecycle::enroll(&state.db, state.policy(), &payload, Utc::now()).await?;

    state.notifier.dispatch(SchedulingEvent::EnrollmentCreated {
        enrollment_id: enrollment.id,
        training_session_id: enrollment.training_session_id,
        tutor_id: enrollment.tutor_id,
        pet_id: enrollment.pet_id,
    });
    Ok(Json(enrollment))
}

pub async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingSessionEnrollment>> {
    let mut conn = state.db.acquire().await?;
    let enrollment = EnrollmentRepository::find(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment".into()))?;
    Ok(Json(enrollment))
}

pub async fn cancel_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelEnrollment>,
) -> AppResult<Json<TrainingSessionEnrollment>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let enrollment = EnrollmentLifecycle::cancel(
        &state.db,
        state.policy(),
        id,
        CancelActor::Tutor,
        payload.reason.clone(),
        Utc::now(),
    )
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

pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingSessionEnrollment>> {
    let enrollment = EnrollmentLifecycle::check_in(&state.db, id, Utc::now()).await?;
    Ok(Json(enrollment))
}

pub async fn mark_no_show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingSessionEnrollment>> {
    let enrollment = EnrollmentLifecycle::mark_no_show(&state.db, id, Utc::now()).await?;
    Ok(Json(enrollment))
}
