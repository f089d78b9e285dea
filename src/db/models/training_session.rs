use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Expired,
    NoShow,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Completed
                | SessionStatus::Cancelled
                | SessionStatus::Expired
                | SessionStatus::NoShow
        )
    }

    /// Allowed transition table. Anything not listed here is rejected.
    pub fn allows(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (Scheduled, Expired)
                | (Confirmed, InProgress)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (InProgress, Completed)
        )
    }
}

/// One concrete, dated, capacity-bounded training slot. `session_key` is the
/// immutable external identity (email links, re-generation); the row id stays
/// internal.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: Uuid,
    pub session_key: Uuid,
    pub company_id: Uuid,
    pub template_id: Option<Uuid>,
    pub package_id: Uuid,
    pub trainer_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_participants: i32,
    pub available_slots: i32,
    pub status: SessionStatus,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub no_show_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingSession {
    /// Fresh session with full capacity, as produced by generation or ad-hoc
    /// creation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        company_id: Uuid,
        template_id: Option<Uuid>,
        package_id: Uuid,
        trainer_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        max_participants: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_key: Uuid::new_v4(),
            company_id,
            template_id,
            package_id,
            trainer_id,
            date,
            start_time,
            end_time,
            max_participants,
            available_slots: max_participants,
            status: SessionStatus::Scheduled,
            confirmed_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            expired_at: None,
            no_show_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Ad-hoc session payload; trainers can open one-off slots outside any
/// template.
#[derive(Debug, Deserialize, Validate)]
pub struct NewTrainingSession {
    pub company_id: Uuid,
    pub package_id: Uuid,
    pub trainer_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[validate(range(min = 1, message = "At least one participant slot is required"))]
    pub max_participants: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_allow_nothing() {
        for terminal in [
            SessionStatus::Completed,
            SessionStatus::Cancelled,
            SessionStatus::Expired,
            SessionStatus::NoShow,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                SessionStatus::Scheduled,
                SessionStatus::Confirmed,
                SessionStatus::InProgress,
                SessionStatus::Completed,
            ] {
                assert!(!terminal.allows(next));
            }
        }
    }

    #[test]
    fn scheduled_cannot_jump_to_completed() {
        assert!(!SessionStatus::Scheduled.allows(SessionStatus::Completed));
        assert!(SessionStatus::Scheduled.allows(SessionStatus::Confirmed));
        assert!(SessionStatus::Confirmed.allows(SessionStatus::InProgress));
        assert!(SessionStatus::InProgress.allows(SessionStatus::Completed));
    }
}
