use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

use super::availability::parse_weekdays;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Once,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    Active,
    Inactive,
}

/// Recurring intent: what sessions should exist. Capacity lives on the
/// generated `TrainingSession` rows, never here.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TrainingSessionTemplate {
    pub id: Uuid,
    pub company_id: Uuid,
    pub package_id: Uuid,
    pub trainer_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_participants: i32,
    pub recurrence: Recurrence,
    pub weekdays: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: TemplateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingSessionTemplate {
    pub fn weekday_set(&self) -> Vec<Weekday> {
        self.weekdays
            .as_deref()
            .map(|raw| parse_weekdays(raw).unwrap_or_default())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewTrainingSessionTemplate {
    pub company_id: Uuid,
    pub package_id: Uuid,
    pub trainer_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[validate(range(min = 1, message = "At least one participant slot is required"))]
    pub max_participants: i32,
    pub recurrence: Recurrence,
    pub weekdays: Option<Vec<String>>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTemplateStatus {
    pub status: TemplateStatus,
}
