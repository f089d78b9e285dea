use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{
    AvailabilityConfig, AvailabilityException, NewAvailabilityConfig, NewAvailabilityException,
};
use crate::db::repositories::AvailabilityRepository;
use crate::error::{AppError, AppResult};
use crate::scheduling::{availability, AvailabilityModel};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct TimeRangeBody {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

pub async fn upsert_config(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
    Json(payload): Json<NewAvailabilityConfig>,
) -> AppResult<Json<AvailabilityConfig>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let config = availability::upsert_config(&state.db, trainer_id, payload, Utc::now()).await?;
    Ok(Json(config))
}

pub async fn get_config(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
) -> AppResult<Json<AvailabilityConfig>> {
    let mut conn = state.db.acquire().await?;
    let config = AvailabilityRepository::find_config(&mut conn, trainer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Availability config".into()))?;
    Ok(Json(config))
}

pub async fn delete_config(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let mut conn = state.db.acquire().await?;
    let deleted = AvailabilityRepository::delete_config(&mut conn, trainer_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Availability config".into()));
    }
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

pub async fn get_working_window(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Option<TimeRangeBody>>> {
    let window = AvailabilityModel::working_window_for(&state.db, trainer_id, query.date).await?;
    Ok(Json(
        window.map(|(start, end)| TimeRangeBody { start, end }),
    ))
}

pub async fn get_free_slots(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<TimeRangeBody>>> {
    let slots = AvailabilityModel::free_slots(&state.db, trainer_id, query.date).await?;
    Ok(Json(
        slots
            .into_iter()
            .map(|(start, end)| TimeRangeBody { start, end })
            .collect(),
    ))
}

pub async fn upsert_exception(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
    Json(payload): Json<NewAvailabilityException>,
) -> AppResult<Json<AvailabilityException>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let exception =
        availability::upsert_exception(&state.db, trainer_id, payload, Utc::now()).await?;
    Ok(Json(exception))
}

pub async fn delete_exception(
    State(state): State<AppState>,
    Path((trainer_id, date)): Path<(Uuid, NaiveDate)>,
) -> AppResult<Json<serde_json::Value>> {
    let mut conn = state.db.acquire().await?;
    let deleted = AvailabilityRepository::delete_exception(&mut conn, trainer_id, date).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Availability exception".into()));
    }
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
