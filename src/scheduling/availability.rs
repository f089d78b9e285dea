use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use sqlx::types::Uuid;
use sqlx::SqlitePool;

use crate::db::models::{
    format_weekdays, parse_weekdays, AvailabilityConfig, AvailabilityException, ExceptionKind,
    NewAvailabilityConfig, NewAvailabilityException,
};
use crate::db::repositories::{AvailabilityRepository, SessionRepository};
use crate::scheduling::error::{SchedulingError, SchedulingResult};

fn overlaps(a: (NaiveTime, NaiveTime), b: (NaiveTime, NaiveTime)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// In-memory view of one trainer's availability over a date range: the
/// recurring config plus any exceptions. All queries on it are pure, so the
/// calendar math stays testable without a database.
#[derive(Debug, Clone, Default)]
pub struct TrainerAvailability {
    pub config: Option<AvailabilityConfig>,
    pub exceptions: HashMap<NaiveDate, AvailabilityException>,
}

impl TrainerAvailability {
    pub fn tz(&self) -> Tz {
        self.config.as_ref().map(|c| c.tz()).unwrap_or(Tz::UTC)
    }

    pub fn buffer_minutes(&self) -> i32 {
        self.config
            .as_ref()
            .and_then(|c| c.buffer_minutes)
            .unwrap_or(0)
    }

    /// The bookable window for a date, after exceptions. None means the
    /// trainer is off that day.
    pub fn working_window_for(&self, date: NaiveDate) -> Option<(NaiveTime, NaiveTime)> {
        if let Some(exception) = self.exceptions.get(&date) {
            return match exception.kind {
                ExceptionKind::Blocked => None,
                ExceptionKind::CustomHours => exception.custom_start.zip(exception.custom_end),
            };
        }
        let config = self.config.as_ref()?;
        if !config.working_day_set().contains(&date.weekday()) {
            return None;
        }
        Some((config.work_start, config.work_end))
    }

    /// Whether `[start, end)` on `date` is bookable: inside the day's window
    /// and clear of both break intervals. Break windows stay in force on
    /// custom-hours days, but only where they intersect the overridden
    /// window.
    pub fn is_available(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        if start >= end {
            return false;
        }
        let Some(window) = self.working_window_for(date) else {
            return false;
        };
        if start < window.0 || end > window.1 {
            return false;
        }
        for brk in self.breaks() {
            if overlaps(brk, window) && overlaps((start, end), brk) {
                return false;
            }
        }
        true
    }

    /// Free bookable slots on `date`, stepped by `slot_duration + buffer`,
    /// skipping breaks and anything in `taken` (existing sessions).
    pub fn free_slots(
        &self,
        date: NaiveDate,
        taken: &[(NaiveTime, NaiveTime)],
    ) -> Vec<(NaiveTime, NaiveTime)> {
        let Some(config) = self.config.as_ref() else {
            return Vec::new();
        };
        let Some(window) = self.working_window_for(date) else {
            return Vec::new();
        };
        let duration = chrono::Duration::minutes(i64::from(config.slot_duration_minutes));
        let step = duration + chrono::Duration::minutes(i64::from(self.buffer_minutes()));

        let mut slots = Vec::new();
        let mut cursor = window.0;
        loop {
            let (slot_end, wrapped) = cursor.overflowing_add_signed(duration);
            if wrapped != 0 || slot_end > window.1 {
                break;
            }
            let candidate = (cursor, slot_end);
            let blocked = self
                .breaks()
                .into_iter()
                .any(|brk| overlaps(brk, window) && overlaps(candidate, brk))
                || taken.iter().any(|t| overlaps(candidate, *t));
            if !blocked {
                slots.push(candidate);
            }
            let (next, wrapped) = cursor.overflowing_add_signed(step);
            if wrapped != 0 || next <= cursor {
                break;
            }
            cursor = next;
        }
        slots
    }

    fn breaks(&self) -> Vec<(NaiveTime, NaiveTime)> {
        let Some(config) = self.config.as_ref() else {
            return Vec::new();
        };
        [config.lunch_break(), config.break_time()]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Pool-backed availability queries: load a snapshot and delegate.
pub struct AvailabilityModel;

impl AvailabilityModel {
    pub async fn snapshot(
        pool: &SqlitePool,
        trainer_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SchedulingResult<TrainerAvailability> {
        let mut conn = pool.acquire().await?;
        let config = AvailabilityRepository::find_config(&mut conn, trainer_id).await?;
        let exceptions = AvailabilityRepository::list_exceptions(&mut conn, trainer_id, from, to)
            .await?
            .into_iter()
            .map(|e| (e.date, e))
            .collect();
        Ok(TrainerAvailability { config, exceptions })
    }

    pub async fn is_available(
        pool: &SqlitePool,
        trainer_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> SchedulingResult<bool> {
        let snapshot = Self::snapshot(pool, trainer_id, date, date).await?;
        Ok(snapshot.is_available(date, start, end))
    }

    pub async fn working_window_for(
        pool: &SqlitePool,
        trainer_id: Uuid,
        date: NaiveDate,
    ) -> SchedulingResult<Option<(NaiveTime, NaiveTime)>> {
        let snapshot = Self::snapshot(pool, trainer_id, date, date).await?;
        Ok(snapshot.working_window_for(date))
    }

    /// Free ad-hoc slots for a day, with the trainer's existing live sessions
    /// taken out.
    pub async fn free_slots(
        pool: &SqlitePool,
        trainer_id: Uuid,
        date: NaiveDate,
    ) -> SchedulingResult<Vec<(NaiveTime, NaiveTime)>> {
        let snapshot = Self::snapshot(pool, trainer_id, date, date).await?;
        let mut conn = pool.acquire().await?;
        let taken: Vec<_> = SessionRepository::list_for_trainer(&mut conn, trainer_id, date, date)
            .await?
            .into_iter()
            .filter(|s| !s.status.is_terminal())
            .map(|s| (s.start_time, s.end_time))
            .collect();
        Ok(snapshot.free_slots(date, &taken))
    }
}

/// Validate and store a trainer's recurring config.
pub async fn upsert_config(
    pool: &SqlitePool,
    trainer_id: Uuid,
    payload: NewAvailabilityConfig,
    now: DateTime<Utc>,
) -> SchedulingResult<AvailabilityConfig> {
    let working_days = parse_weekdays(&payload.working_days.join(","))
        .map_err(SchedulingError::Validation)?;
    if working_days.is_empty() {
        return Err(SchedulingError::Validation(
            "At least one working day is required".into(),
        ));
    }
    payload
        .timezone
        .parse::<Tz>()
        .map_err(|_| SchedulingError::Validation(format!("Unknown timezone: {}", payload.timezone)))?;
    if payload.work_start >= payload.work_end {
        return Err(SchedulingError::Validation(
            "work_start must be before work_end".into(),
        ));
    }

    let window = (payload.work_start, payload.work_end);
    let lunch = check_break_pair("lunch_break", payload.lunch_break_start, payload.lunch_break_end, window)?;
    let other = check_break_pair("break", payload.break_start, payload.break_end, window)?;
    if let (Some(a), Some(b)) = (lunch, other) {
        if overlaps(a, b) {
            return Err(SchedulingError::Validation(
                "Break intervals must not overlap".into(),
            ));
        }
    }

    let config = AvailabilityConfig {
        id: Uuid::new_v4(),
        company_id: payload.company_id,
        trainer_id,
        work_start: payload.work_start,
        work_end: payload.work_end,
        slot_duration_minutes: payload.slot_duration_minutes,
        lunch_break_start: payload.lunch_break_start,
        lunch_break_end: payload.lunch_break_end,
        break_start: payload.break_start,
        break_end: payload.break_end,
        working_days: format_weekdays(&working_days),
        timezone: payload.timezone,
        buffer_minutes: payload.buffer_minutes,
        max_bookings_per_day: payload.max_bookings_per_day,
        advance_booking_days: payload.advance_booking_days.unwrap_or(30),
        min_notice_hours: payload.min_notice_hours.unwrap_or(24),
        created_at: now,
        updated_at: now,
    };

    let mut conn = pool.acquire().await?;
    Ok(AvailabilityRepository::upsert_config(&mut conn, &config).await?)
}

/// Validate and store a date-specific override for a trainer.
pub async fn upsert_exception(
    pool: &SqlitePool,
    trainer_id: Uuid,
    payload: NewAvailabilityException,
    now: DateTime<Utc>,
) -> SchedulingResult<AvailabilityException> {
    if payload.kind == ExceptionKind::CustomHours {
        match payload.custom_start.zip(payload.custom_end) {
            Some((start, end)) if start < end => {}
            Some(_) => {
                return Err(SchedulingError::Validation(
                    "custom_start must be before custom_end".into(),
                ))
            }
            None => {
                return Err(SchedulingError::Validation(
                    "Custom hours require both custom_start and custom_end".into(),
                ))
            }
        }
    }

    let exception = AvailabilityException {
        id: Uuid::new_v4(),
        company_id: payload.company_id,
        trainer_id,
        date: payload.date,
        kind: payload.kind,
        custom_start: payload.custom_start.filter(|_| payload.kind == ExceptionKind::CustomHours),
        custom_end: payload.custom_end.filter(|_| payload.kind == ExceptionKind::CustomHours),
        created_at: now,
    };

    let mut conn = pool.acquire().await?;
    Ok(AvailabilityRepository::upsert_exception(&mut conn, &exception).await?)
}

fn check_break_pair(
    name: &str,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    window: (NaiveTime, NaiveTime),
) -> SchedulingResult<Option<(NaiveTime, NaiveTime)>> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(s), Some(e)) => {
            if s >= e {
                return Err(SchedulingError::Validation(format!(
                    "{name} start must be before its end"
                )));
            }
            if s < window.0 || e > window.1 {
                return Err(SchedulingError::Validation(format!(
                    "{name} must lie within the work window"
                )));
            }
            Ok(Some((s, e)))
        }
        _ => Err(SchedulingError::Validation(format!(
            "{name} requires both start and end or neither"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn config() -> AvailabilityConfig {
        AvailabilityConfig {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            trainer_id: Uuid::new_v4(),
            work_start: t(9, 0),
            work_end: t(17, 0),
            slot_duration_minutes: 60,
            lunch_break_start: Some(t(12, 0)),
            lunch_break_end: Some(t(13, 0)),
            break_start: None,
            break_end: None,
            working_days: "mon,tue,wed,thu,fri".into(),
            timezone: "UTC".into(),
            buffer_minutes: None,
            max_bookings_per_day: None,
            advance_booking_days: 30,
            min_notice_hours: 24,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn availability() -> TrainerAvailability {
        TrainerAvailability {
            config: Some(config()),
            exceptions: HashMap::new(),
        }
    }

    fn exception(date: NaiveDate, kind: ExceptionKind) -> AvailabilityException {
        AvailabilityException {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            trainer_id: Uuid::new_v4(),
            date,
            kind,
            custom_start: None,
            custom_end: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_config_is_never_available() {
        let empty = TrainerAvailability::default();
        assert!(!empty.is_available(d(2025, 1, 6), t(10, 0), t(11, 0)));
        assert!(empty.working_window_for(d(2025, 1, 6)).is_none());
    }

    #[test]
    fn weekday_outside_working_days_is_unavailable() {
        let avail = availability();
        // 2025-01-05 is a Sunday.
        assert_eq!(d(2025, 1, 5).weekday(), chrono::Weekday::Sun);
        assert!(!avail.is_available(d(2025, 1, 5), t(10, 0), t(11, 0)));
        assert!(avail.is_available(d(2025, 1, 6), t(10, 0), t(11, 0)));
    }

    #[test]
    fn range_must_fit_inside_work_window() {
        let avail = availability();
        assert!(!avail.is_available(d(2025, 1, 6), t(8, 0), t(9, 30)));
        assert!(!avail.is_available(d(2025, 1, 6), t(16, 30), t(17, 30)));
        assert!(avail.is_available(d(2025, 1, 6), t(9, 0), t(10, 0)));
    }

    #[test]
    fn lunch_break_blocks_overlapping_ranges() {
        let avail = availability();
        assert!(!avail.is_available(d(2025, 1, 6), t(11, 30), t(12, 30)));
        assert!(!avail.is_available(d(2025, 1, 6), t(12, 15), t(12, 45)));
        // Touching the break boundary is fine.
        assert!(avail.is_available(d(2025, 1, 6), t(11, 0), t(12, 0)));
        assert!(avail.is_available(d(2025, 1, 6), t(13, 0), t(14, 0)));
    }

    #[test]
    fn blocked_exception_wins_over_config() {
        let mut avail = availability();
        let date = d(2025, 1, 6);
        avail.exceptions.insert(date, exception(date, ExceptionKind::Blocked));
        assert!(!avail.is_available(date, t(10, 0), t(11, 0)));
        assert!(avail.working_window_for(date).is_none());
    }

    #[test]
    fn custom_hours_override_window_but_keep_breaks() {
        let mut avail = availability();
        let date = d(2025, 1, 5); // Sunday, normally off
        let mut ex = exception(date, ExceptionKind::CustomHours);
        ex.custom_start = Some(t(10, 0));
        ex.custom_end = Some(t(14, 0));
        avail.exceptions.insert(date, ex);

        // Overridden window applies even though Sunday is not a working day.
        assert!(avail.is_available(date, t(10, 0), t(11, 0)));
        assert!(!avail.is_available(date, t(14, 0), t(15, 0)));
        // The configured lunch break intersects the override and still blocks.
        assert!(!avail.is_available(date, t(11, 30), t(12, 30)));
    }

    #[test]
    fn custom_hours_outside_breaks_ignore_them() {
        let mut avail = availability();
        let date = d(2025, 1, 5);
        let mut ex = exception(date, ExceptionKind::CustomHours);
        ex.custom_start = Some(t(17, 0));
        ex.custom_end = Some(t(20, 0));
        avail.exceptions.insert(date, ex);
        // Evening override does not intersect the lunch break at all.
        assert!(avail.is_available(date, t(17, 0), t(18, 0)));
    }

    #[test]
    fn free_slots_step_and_skip() {
        let mut avail = availability();
        avail.config.as_mut().unwrap().buffer_minutes = Some(30);
        let date = d(2025, 1, 6);
        // 60-minute slots every 90 minutes: 09:00, 10:30, 12:00(lunch, out),
        // 13:30, 15:00; 16:30 would end past 17:00 and 12:00 hits lunch.
        let taken = [(t(13, 30), t(14, 30))];
        let slots = avail.free_slots(date, &taken);
        assert_eq!(
            slots,
            vec![(t(9, 0), t(10, 0)), (t(10, 30), t(11, 30)), (t(15, 0), t(16, 0))]
        );
    }
}
