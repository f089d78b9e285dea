use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Enrolled,
    Confirmed,
    CheckedIn,
    Cancelled,
    NoShow,
}

impl EnrollmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EnrollmentStatus::CheckedIn | EnrollmentStatus::Cancelled | EnrollmentStatus::NoShow
        )
    }

    /// Counts against capacity and daily booking limits. A no-show keeps its
    /// slot and its consumed balance.
    pub fn holds_slot(self) -> bool {
        !matches!(self, EnrollmentStatus::Cancelled)
    }

    pub fn allows(self, next: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, next),
            (Pending, Enrolled)
                | (Pending, Cancelled)
                | (Enrolled, Confirmed)
                | (Enrolled, Cancelled)
                | (Enrolled, NoShow)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CancelActor {
    Tutor,
    Trainer,
    System,
}

/// A pet's booking into one session. The confirmation and cancellation tokens
/// are stable capability identifiers for unauthenticated email-link actions;
/// they are never rotated or deleted.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TrainingSessionEnrollment {
    pub id: Uuid,
    pub company_id: Uuid,
    pub training_session_id: Uuid,
    pub tutor_id: Uuid,
    pub pet_id: Uuid,
    pub package_purchase_id: Uuid,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub confirmation_token: Uuid,
    pub cancellation_token: Uuid,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancelActor>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub no_show_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewEnrollment {
    pub company_id: Uuid,
    pub training_session_id: Uuid,
    pub tutor_id: Uuid,
    pub pet_id: Uuid,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelEnrollment {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollment_machine_shape() {
        use EnrollmentStatus::*;
        assert!(Enrolled.allows(Confirmed));
        assert!(Confirmed.allows(CheckedIn));
        assert!(!Enrolled.allows(CheckedIn));
        assert!(!Cancelled.allows(Enrolled));
        assert!(!NoShow.allows(Cancelled));
        assert!(Cancelled.is_terminal());
        assert!(!Cancelled.holds_slot());
        assert!(NoShow.holds_slot());
    }
}
