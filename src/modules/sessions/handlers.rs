use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::types::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{NewTrainingSession, TrainingSession, TrainingSessionEnrollment};
use crate::db::repositories::{EnrollmentRepository, SessionRepository};
use crate::error::{AppError, AppResult};
use crate::scheduling::AvailabilityModel;

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub trainer_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Ad-hoc session outside any template. Still availability-checked and
/// non-overlapping like generated slots.
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<NewTrainingSession>,
) -> AppResult<Json<TrainingSession>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if payload.start_time >= payload.end_time {
        return Err(AppError::Validation(
            "start_time must be before end_time".into(),
        ));
    }

    let available = AvailabilityModel::is_available(
        &state.db,
        payload.trainer_id,
        payload.date,
        payload.start_time,
        payload.end_time,
    )
    .await?;
    if !available {
        return Err(AppError::Validation(
            "Trainer is not available for that time".into(),
        ));
    }

    let now = Utc::now();
    let session = TrainingSession::new(
        payload.company_id,
        None,
        payload.package_id,
        payload.trainer_id,
        payload.date,
        payload.start_time,
        payload.end_time,
        payload.max_participants,
        now,
    );

    let mut tx = state.db.begin().await?;
    let overlapping = SessionRepository::count_overlapping(
        &mut *tx,
        payload.trainer_id,
        payload.date,
        payload.start_time,
        payload.end_time,
    )
    .await?;
    if overlapping > 0 {
        return Err(AppError::Validation(
            "The slot overlaps an existing session".into(),
        ));
    }
    SessionRepository::insert(&mut *tx, &session).await?;
    tx.commit().await?;

    Ok(Json(session))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingSession>> {
    let mut conn = state.db.acquire().await?;
    let session = SessionRepository::find(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Training session".into()))?;
    Ok(Json(session))
}

/// Lookup by the immutable external key used in outbound links.
pub async fn get_session_by_key(
    State(state): State<AppState>,
    Path(session_key): Path<Uuid>,
) -> AppResult<Json<TrainingSession>> {
    let mut conn = state.db.acquire().await?;
    let session = SessionRepository::find_by_key(&mut conn, session_key)
        .await?
        .ok_or_else(|| AppError::NotFound("Training session".into()))?;
    Ok(Json(session))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> AppResult<Json<Vec<TrainingSession>>> {
    let mut conn = state.db.acquire().await?;
    let sessions =
        SessionRepository::list_for_trainer(&mut conn, query.trainer_id, query.from, query.to)
            .await?;
    Ok(Json(sessions))
}

pub async fn list_session_enrollments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<TrainingSessionEnrollment>>> {
    let mut conn = state.db.acquire().await?;
    if SessionRepository::find(&mut conn, id).await?.is_none() {
        return Err(AppError::NotFound("Training session".into()));
    }
    let enrollments = EnrollmentRepository::list_for_session(&mut conn, id).await?;
    Ok(Json(enrollments))
}
