use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    Blocked,
    CustomHours,
}

/// Recurring working hours for one trainer. Unique per trainer; date-specific
/// overrides live in `AvailabilityException`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    pub id: Uuid,
    pub company_id: Uuid,
    pub trainer_id: Uuid,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub slot_duration_minutes: i32,
    pub lunch_break_start: Option<NaiveTime>,
    pub lunch_break_end: Option<NaiveTime>,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
    pub working_days: String,
    pub timezone: String,
    pub buffer_minutes: Option<i32>,
    pub max_bookings_per_day: Option<i32>,
    pub advance_booking_days: i32,
    pub min_notice_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilityConfig {
    pub fn working_day_set(&self) -> Vec<Weekday> {
        parse_weekdays(&self.working_days).unwrap_or_default()
    }

    /// Trainer timezone; falls back to UTC if the stored name no longer parses.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or(chrono_tz::Tz::UTC)
    }

    pub fn lunch_break(&self) -> Option<(NaiveTime, NaiveTime)> {
        self.lunch_break_start.zip(self.lunch_break_end)
    }

    pub fn break_time(&self) -> Option<(NaiveTime, NaiveTime)> {
        self.break_start.zip(self.break_end)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAvailabilityConfig {
    pub company_id: Uuid,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    #[validate(range(min = 1, max = 480))]
    pub slot_duration_minutes: i32,
    pub lunch_break_start: Option<NaiveTime>,
    pub lunch_break_end: Option<NaiveTime>,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
    #[validate(length(min = 1, message = "At least one working day is required"))]
    pub working_days: Vec<String>,
    #[validate(length(min = 1))]
    pub timezone: String,
    #[validate(range(min = 0, max = 240))]
    pub buffer_minutes: Option<i32>,
    #[validate(range(min = 1))]
    pub max_bookings_per_day: Option<i32>,
    #[validate(range(min = 1, max = 365))]
    pub advance_booking_days: Option<i32>,
    #[validate(range(min = 0, max = 720))]
    pub min_notice_hours: Option<i32>,
}

/// Date-specific override: a fully blocked day, or custom hours replacing the
/// recurring work window for that one date.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub id: Uuid,
    pub company_id: Uuid,
    pub trainer_id: Uuid,
    pub date: NaiveDate,
    pub kind: ExceptionKind,
    pub custom_start: Option<NaiveTime>,
    pub custom_end: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAvailabilityException {
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub kind: ExceptionKind,
    pub custom_start: Option<NaiveTime>,
    pub custom_end: Option<NaiveTime>,
}

const WEEKDAY_CODES: [(&str, Weekday); 7] = [
    ("mon", Weekday::Mon),
    ("tue", Weekday::Tue),
    ("wed", Weekday::Wed),
    ("thu", Weekday::Thu),
    ("fri", Weekday::Fri),
    ("sat", Weekday::Sat),
    ("sun", Weekday::Sun),
];

/// Parse a stored weekday list ("mon,wed,fri") into chrono weekdays.
pub fn parse_weekdays(raw: &str) -> Result<Vec<Weekday>, String> {
    let mut days = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let day = WEEKDAY_CODES
            .iter()
            .find(|(c, _)| *c == code.to_lowercase())
            .map(|(_, d)| *d)
            .ok_or_else(|| format!("Unknown weekday code: {code}"))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

pub fn format_weekdays(days: &[Weekday]) -> String {
    days.iter()
        .filter_map(|d| WEEKDAY_CODES.iter().find(|(_, w)| w == d).map(|(c, _)| *c))
        .collect::<Vec<_>>()
        .join(",")
}
