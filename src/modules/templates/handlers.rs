use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::types::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{
    format_weekdays, parse_weekdays, NewTrainingSessionTemplate, Recurrence, TemplateStatus,
    TrainingSessionTemplate, UpdateTemplateStatus,
};
use crate::db::repositories::TemplateRepository;
use crate::error::{AppError, AppResult};
use crate::notify::SchedulingEvent;
use crate::scheduling::{GenerationReport, SlotGenerator};

#[derive(Debug, Deserialize)]
pub struct GenerateRange {
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(payload): Json<NewTrainingSessionTemplate>,
) -> AppResult<Json<TrainingSessionTemplate>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if payload.start_time >= payload.end_time {
        return Err(AppError::Validation(
            "start_time must be before end_time".into(),
        ));
    }
    if payload.start_date > payload.end_date {
        return Err(AppError::Validation(
            "start_date must not be after end_date".into(),
        ));
    }

    let weekdays = match (&payload.recurrence, &payload.weekdays) {
        (Recurrence::Weekly, Some(days)) => {
            let parsed = parse_weekdays(&days.join(",")).map_err(AppError::Validation)?;
            if parsed.is_empty() {
                return Err(AppError::Validation(
                    "Weekly templates need at least one weekday".into(),
                ));
            }
            Some(format_weekdays(&parsed))
        }
        (Recurrence::Weekly, None) => {
            return Err(AppError::Validation(
                "Weekly templates need at least one weekday".into(),
            ))
        }
        _ => None,
    };

    let now = Utc::now();
    let template = TrainingSessionTemplate {
        id: Uuid::new_v4(),
        company_id: payload.company_id,
        package_id: payload.package_id,
        trainer_id: payload.trainer_id,
        start_time: payload.start_time,
        end_time: payload.end_time,
        max_participants: payload.max_participants,
        recurrence: payload.recurrence,
        weekdays,
        start_date: payload.start_date,
        end_date: payload.end_date,
        status: TemplateStatus::Active,
        created_at: now,
        updated_at: now,
    };

    let mut conn = state.db.acquire().await?;
    let template = TemplateRepository::insert(&mut conn, &template).await?;
    Ok(Json(template))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingSessionTemplate>> {
    let mut conn = state.db.acquire().await?;
    let template = TemplateRepository::find(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template".into()))?;
    Ok(Json(template))
}

pub async fn set_template_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTemplateStatus>,
) -> AppResult<Json<TrainingSessionTemplate>> {
    let mut conn = state.db.acquire().await?;
    let template = TemplateRepository::set_status(&mut conn, id, payload.status, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound("Template".into()))?;
    Ok(Json(template))
}

pub async fn list_templates_for_trainer(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
) -> AppResult<Json<Vec<TrainingSessionTemplate>>> {
    let mut conn = state.db.acquire().await?;
    let templates = TemplateRepository::list_for_trainer(&mut conn, trainer_id).await?;
    Ok(Json(templates))
}

/// Expand the template over the requested range. Safe to call repeatedly;
/// already-generated dates come back as skipped.
pub async fn generate_sessions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(range): Json<GenerateRange>,
) -> AppResult<Json<GenerationReport>> {
    if range.range_start > range.range_end {
        return Err(AppError::Validation(
            "range_start must not be after range_end".into(),
        ));
    }
    let report =
        SlotGenerator::generate(&state.db, id, range.range_start, range.range_end, Utc::now())
            .await?;

    state.notifier.dispatch(SchedulingEvent::SessionsGenerated {
        template_id: id,
        created: report.created.len(),
        skipped: report.skipped.len(),
    });
    Ok(Json(report))
}
