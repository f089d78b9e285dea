use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::types::Uuid;
use sqlx::SqlitePool;

use crate::db::models::{Recurrence, TemplateStatus, TrainingSession, TrainingSessionTemplate};
use crate::db::repositories::{SessionRepository, TemplateRepository};
use crate::scheduling::availability::{AvailabilityModel, TrainerAvailability};
use crate::scheduling::error::{SchedulingError, SchedulingResult};

/// Why a candidate date produced no session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Trainer not available for the template's time window on that date.
    Unavailable,
    /// A session for this (template, date, start) already exists.
    Duplicate,
    /// The slot would overlap another live session of the trainer.
    Overlap,
    /// Storage failed for this date only; the rest of the batch went on.
    Error(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unavailable => write!(f, "trainer unavailable"),
            SkipReason::Duplicate => write!(f, "session already generated"),
            SkipReason::Overlap => write!(f, "overlaps an existing session"),
            SkipReason::Error(e) => write!(f, "storage error: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Generate,
    Skip(SkipReason),
}

#[derive(Debug, Clone)]
pub struct SlotPlan {
    pub date: NaiveDate,
    pub outcome: PlanOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: SkipReason,
}

/// Per-date outcome of one generation run. Re-running over an overlapping
/// range reports the existing dates as skipped duplicates.
#[derive(Debug, Default, Serialize)]
pub struct GenerationReport {
    pub created: Vec<TrainingSession>,
    pub skipped: Vec<SkippedDate>,
}

pub struct SlotGenerator;

impl SlotGenerator {
    /// Pure expansion of a template over `[range_start, range_end]` against an
    /// availability snapshot. No storage access; the dedup/overlap checks
    /// happen in `generate`.
    pub fn plan(
        template: &TrainingSessionTemplate,
        availability: &TrainerAvailability,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Vec<SlotPlan> {
        let start = range_start.max(template.start_date);
        let end = range_end.min(template.end_date);
        if start > end {
            return Vec::new();
        }

        Self::candidate_dates(template, start, end)
            .into_iter()
            .map(|date| {
                let outcome = if availability.is_available(
                    date,
                    template.start_time,
                    template.end_time,
                ) {
                    PlanOutcome::Generate
                } else {
                    PlanOutcome::Skip(SkipReason::Unavailable)
                };
                SlotPlan { date, outcome }
            })
            .collect()
    }

    fn candidate_dates(
        template: &TrainingSessionTemplate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<NaiveDate> {
        match template.recurrence {
            Recurrence::Once => {
                if (start..=end).contains(&template.start_date) {
                    vec![template.start_date]
                } else {
                    Vec::new()
                }
            }
            Recurrence::Daily => Self::dates_between(start, end),
            Recurrence::Weekly => {
                let weekdays = template.weekday_set();
                Self::dates_between(start, end)
                    .into_iter()
                    .filter(|d| weekdays.contains(&d.weekday()))
                    .collect()
            }
            Recurrence::Monthly => {
                // Anchored on the template start's day-of-month. Months
                // without that day (e.g. the 31st in February) are skipped.
                let day = template.start_date.day();
                let mut dates = Vec::new();
                let mut year = start.year();
                let mut month = start.month();
                loop {
                    let anchor = NaiveDate::from_ymd_opt(year, month, day);
                    if let Some(date) = anchor {
                        if date > end {
                            break;
                        }
                        if date >= start {
                            dates.push(date);
                        }
                    } else if NaiveDate::from_ymd_opt(year, month, 1)
                        .map(|first| first > end)
                        .unwrap_or(true)
                    {
                        break;
                    }
                    month += 1;
                    if month > 12 {
                        month = 1;
                        year += 1;
                    }
                }
                dates
            }
        }
    }

    fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut cursor = start;
        while cursor <= end {
            dates.push(cursor);
            cursor += Duration::days(1);
        }
        dates
    }

    /// Expand and persist sessions for a template. Idempotent: re-running for
    /// an overlapping range never duplicates a `(template, date, start)` slot.
    /// Per-date failures are collected in the report instead of aborting the
    /// batch.
    pub async fn generate(
        pool: &SqlitePool,
        template_id: Uuid,
        range_start: NaiveDate,
        range_end: NaiveDate,
        now: DateTime<Utc>,
    ) -> SchedulingResult<GenerationReport> {
        let mut conn = pool.acquire().await?;
        let template = TemplateRepository::find(&mut conn, template_id)
            .await?
            .ok_or(SchedulingError::NotFound("Template"))?;
        if template.status != TemplateStatus::Active {
            return Err(SchedulingError::Validation(
                "Template is inactive; no sessions were generated".into(),
            ));
        }
        if template.start_time >= template.end_time {
            return Err(SchedulingError::Validation(
                "Template start_time must be before end_time".into(),
            ));
        }
        drop(conn);

        let availability = AvailabilityModel::snapshot(
            pool,
            template.trainer_id,
            range_start.max(template.start_date),
            range_end.min(template.end_date),
        )
        .await?;
        let buffer = Duration::minutes(i64::from(availability.buffer_minutes()));
        let plans = Self::plan(&template, &availability, range_start, range_end);

        let mut report = GenerationReport::default();
        for plan in plans {
            match plan.outcome {
                PlanOutcome::Skip(reason) => {
                    report.skipped.push(SkippedDate { date: plan.date, reason });
                }
                PlanOutcome::Generate => {
                    match Self::apply_date(pool, &template, plan.date, buffer, now).await {
                        Ok(Ok(session)) => report.created.push(session),
                        Ok(Err(reason)) => {
                            report.skipped.push(SkippedDate { date: plan.date, reason });
                        }
                        Err(err) => {
                            tracing::warn!(
                                template_id = %template.id,
                                date = %plan.date,
                                error = %err,
                                "Slot generation failed for one date"
                            );
                            report.skipped.push(SkippedDate {
                                date: plan.date,
                                reason: SkipReason::Error(err.to_string()),
                            });
                        }
                    }
                }
            }
        }
        Ok(report)
    }

    /// One transaction per date: overlap check plus dedup insert, so a
    /// concurrent run of the same template cannot double-create a slot.
    async fn apply_date(
        pool: &SqlitePool,
        template: &TrainingSessionTemplate,
        date: NaiveDate,
        buffer: Duration,
        now: DateTime<Utc>,
    ) -> Result<Result<TrainingSession, SkipReason>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Pad by the trainer's buffer, clamped to the day's bounds.
        let (padded_start, start_wrap) = template.start_time.overflowing_sub_signed(buffer);
        let (padded_end, end_wrap) = template.end_time.overflowing_add_signed(buffer);
        let padded_start = if start_wrap != 0 { NaiveTime::MIN } else { padded_start };
        let padded_end = if end_wrap != 0 {
            NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(template.end_time)
        } else {
            padded_end
        };

        let overlapping = SessionRepository::count_overlapping(
            &mut *tx,
            template.trainer_id,
            date,
            padded_start,
            padded_end,
        )
        .await?;

        let session = TrainingSession::new(
            template.company_id,
            Some(template.id),
            template.package_id,
            template.trainer_id,
            date,
            template.start_time,
            template.end_time,
            template.max_participants,
            now,
        );

        // The duplicate check must see its own template's slot as a dup, not
        // as an overlap, so probe the dedup insert first.
        let inserted = SessionRepository::insert_generated(&mut *tx, &session).await?;
        if !inserted {
            tx.rollback().await?;
            return Ok(Err(SkipReason::Duplicate));
        }
        if overlapping > 0 {
            tx.rollback().await?;
            return Ok(Err(SkipReason::Overlap));
        }

        tx.commit().await?;
        Ok(Ok(session))
    }
}
