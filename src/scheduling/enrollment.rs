use chrono::{DateTime, Duration, Utc};
use sqlx::types::Uuid;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{
    AvailabilityConfig, CancelActor, EnrollmentStatus, NewEnrollment, SessionStatus,
    TrainingSession, TrainingSessionEnrollment,
};
use crate::db::repositories::{
    AvailabilityRepository, EnrollmentRepository, PetRepository, SessionRepository,
};
use crate::scheduling::balance::PackageBalanceTracker;
use crate::scheduling::capacity::SessionCapacityLedger;
use crate::scheduling::error::{is_unique_violation, SchedulingError, SchedulingResult};
use crate::scheduling::local_to_utc;

/// App-level time-window rules. The per-trainer `min_notice_hours` and
/// `advance_booking_days` on AvailabilityConfig override the defaults here;
/// the cancellation cutoff is a separate, company-wide rule.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingPolicy {
    pub cancellation_cutoff_hours: i64,
    pub default_min_notice_hours: i64,
    pub default_advance_booking_days: i64,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            cancellation_cutoff_hours: 24,
            default_min_notice_hours: 24,
            default_advance_booking_days: 30,
        }
    }
}

/// State machine for a pet's booking into a session. All mutations run in a
/// single transaction; capacity and balance either both move or neither
/// does.
pub struct EnrollmentLifecycle;

impl EnrollmentLifecycle {
    /// Enroll a pet into a session. Preconditions are checked in order and
    /// the first failure wins; nothing is written unless all of them pass.
    pub async fn enroll(
        pool: &SqlitePool,
        policy: SchedulingPolicy,
        payload: &NewEnrollment,
        now: DateTime<Utc>,
    ) -> SchedulingResult<TrainingSessionEnrollment> {
        let mut tx = pool.begin().await?;

        let session = SessionRepository::find(&mut *tx, payload.training_session_id)
            .await?
            .ok_or(SchedulingError::NotFound("Training session"))?;
        if session.status.is_terminal() {
            return Err(SchedulingError::Validation(
                "Session is no longer open for enrollment".into(),
            ));
        }

        let config = AvailabilityRepository::find_config(&mut *tx, session.trainer_id).await?;
        check_booking_window(&session, config.as_ref(), policy, now)?;

        if let Some(cap) = config.as_ref().and_then(|c| c.max_bookings_per_day) {
            let booked =
                EnrollmentRepository::count_for_trainer_on(&mut *tx, session.trainer_id, session.date)
                    .await?;
            if booked >= i64::from(cap) {
                return Err(SchedulingError::Validation(
                    "The trainer's daily booking limit has been reached".into(),
                ));
            }
        }

        let pet = PetRepository::find(&mut *tx, payload.pet_id)
            .await?
            .ok_or(SchedulingError::NotFound("Pet"))?;
        if pet.tutor_id != payload.tutor_id {
            return Err(SchedulingError::Validation(
                "Pet does not belong to this tutor".into(),
            ));
        }

        if EnrollmentRepository::find_active_for_pet(&mut *tx, session.id, pet.id)
            .await?
            .is_some()
        {
            return Err(SchedulingError::AlreadyEnrolled);
        }

        let purchase = PackageBalanceTracker::active_purchase(
            &mut *tx,
            payload.tutor_id,
            session.package_id,
            now,
        )
        .await?
        .ok_or(SchedulingError::NoActivePurchase)?;

        // Capacity first, then balance; the transaction rolls both back on
        // any later failure.
        SessionCapacityLedger::reserve(&mut *tx, session.id, now).await?;
        PackageBalanceTracker::consume(&mut *tx, purchase.id, now).await?;

        let enrollment = TrainingSessionEnrollment {
            id: Uuid::new_v4(),
            company_id: session.company_id,
            training_session_id: session.id,
            tutor_id: payload.tutor_id,
            pet_id: pet.id,
            package_purchase_id: purchase.id,
            status: EnrollmentStatus::Enrolled,
            enrolled_at: now,
            confirmation_token: Uuid::new_v4(),
            cancellation_token: Uuid::new_v4(),
            cancellation_reason: None,
            cancelled_by: None,
            confirmed_at: None,
            checked_in_at: None,
            cancelled_at: None,
            no_show_at: None,
            created_at: now,
            updated_at: now,
        };
        let enrollment = EnrollmentRepository::insert(&mut *tx, &enrollment)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    SchedulingError::AlreadyEnrolled
                } else {
                    SchedulingError::Database(e)
                }
            })?;

        tx.commit().await?;
        Ok(enrollment)
    }

    /// Cancel an enrollment, releasing its slot and refunding its purchase.
    /// Only allowed while the session start is further away than the
    /// cancellation cutoff.
    pub async fn cancel(
        pool: &SqlitePool,
        policy: SchedulingPolicy,
        enrollment_id: Uuid,
        actor: CancelActor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> SchedulingResult<TrainingSessionEnrollment> {
        let mut tx = pool.begin().await?;
        let enrollment = EnrollmentRepository::find(&mut *tx, enrollment_id)
            .await?
            .ok_or(SchedulingError::NotFound("Enrollment"))?;
        if enrollment.status.is_terminal() {
            return Err(SchedulingError::Validation(
                "Enrollment can no longer be cancelled from its current state".into(),
            ));
        }
        let cancelled = cancel_in_tx(&mut *tx, &enrollment, policy, actor, reason, now).await?;
        tx.commit().await?;
        Ok(cancelled)
    }

    /// Email-link confirmation. No authentication; the token is the
    /// capability. Re-using the link after confirming is a no-op.
    pub async fn confirm_by_token(
        pool: &SqlitePool,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> SchedulingResult<TrainingSessionEnrollment> {
        let mut tx = pool.begin().await?;
        let enrollment = EnrollmentRepository::find_by_confirmation_token(&mut *tx, token)
            .await?
            .ok_or(SchedulingError::NotFound("Enrollment"))?;

        match enrollment.status {
            EnrollmentStatus::Confirmed | EnrollmentStatus::CheckedIn => {
                tx.commit().await?;
                return Ok(enrollment);
            }
            status if status.allows(EnrollmentStatus::Confirmed) => {}
            _ => {
                return Err(SchedulingError::Validation(
                    "Enrollment can no longer be confirmed".into(),
                ))
            }
        }

        let confirmed =
            EnrollmentRepository::set_status(&mut *tx, enrollment.id, EnrollmentStatus::Confirmed, now)
                .await?
                .ok_or(SchedulingError::NotFound("Enrollment"))?;

        // First confirmation also firms up a still-scheduled session.
        if let Some(session) =
            SessionRepository::find(&mut *tx, enrollment.training_session_id).await?
        {
            if session.status.allows(SessionStatus::Confirmed) {
                SessionRepository::set_status(&mut *tx, session.id, SessionStatus::Confirmed, now)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(confirmed)
    }

    /// Email-link cancellation. Same window rules as an authenticated
    /// cancel; an already-cancelled enrollment is returned unchanged.
    pub async fn cancel_by_token(
        pool: &SqlitePool,
        policy: SchedulingPolicy,
        token: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> SchedulingResult<TrainingSessionEnrollment> {
        let mut tx = pool.begin().await?;
        let enrollment = EnrollmentRepository::find_by_cancellation_token(&mut *tx, token)
            .await?
            .ok_or(SchedulingError::NotFound("Enrollment"))?;

        if enrollment.status == EnrollmentStatus::Cancelled {
            tx.commit().await?;
            return Ok(enrollment);
        }
        if enrollment.status.is_terminal() {
            return Err(SchedulingError::Validation(
                "Enrollment can no longer be cancelled from its current state".into(),
            ));
        }
        let cancelled =
            cancel_in_tx(&mut *tx, &enrollment, policy, CancelActor::Tutor, reason, now).await?;
        tx.commit().await?;
        Ok(cancelled)
    }

    /// Trainer marks an arrived pet as checked in.
    pub async fn check_in(
        pool: &SqlitePool,
        enrollment_id: Uuid,
        now: DateTime<Utc>,
    ) -> SchedulingResult<TrainingSessionEnrollment> {
        Self::transition(pool, enrollment_id, EnrollmentStatus::CheckedIn, now).await
    }

    /// Trainer marks an absentee. The slot and the consumed session stay
    /// spent.
    pub async fn mark_no_show(
        pool: &SqlitePool,
        enrollment_id: Uuid,
        now: DateTime<Utc>,
    ) -> SchedulingResult<TrainingSessionEnrollment> {
        Self::transition(pool, enrollment_id, EnrollmentStatus::NoShow, now).await
    }

    async fn transition(
        pool: &SqlitePool,
        enrollment_id: Uuid,
        next: EnrollmentStatus,
        now: DateTime<Utc>,
    ) -> SchedulingResult<TrainingSessionEnrollment> {
        let mut tx = pool.begin().await?;
        let enrollment = EnrollmentRepository::find(&mut *tx, enrollment_id)
            .await?
            .ok_or(SchedulingError::NotFound("Enrollment"))?;
        if !enrollment.status.allows(next) {
            return Err(SchedulingError::Validation(format!(
                "Enrollment cannot move from its current state to {next:?}"
            )));
        }
        let updated = EnrollmentRepository::set_status(&mut *tx, enrollment_id, next, now)
            .await?
            .ok_or(SchedulingError::NotFound("Enrollment"))?;
        tx.commit().await?;
        Ok(updated)
    }
}

/// Shared cancel body: window check, state write, slot release, refund.
async fn cancel_in_tx(
    tx: &mut SqliteConnection,
    enrollment: &TrainingSessionEnrollment,
    policy: SchedulingPolicy,
    actor: CancelActor,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> SchedulingResult<TrainingSessionEnrollment> {
    let session = SessionRepository::find(tx, enrollment.training_session_id)
        .await?
        .ok_or(SchedulingError::NotFound("Training session"))?;
    let config = AvailabilityRepository::find_config(tx, session.trainer_id).await?;

    let start = session_start_utc(&session, config.as_ref());
    let cutoff = Duration::hours(policy.cancellation_cutoff_hours);
    if start - now <= cutoff {
        return Err(SchedulingError::CancellationWindow {
            hours: policy.cancellation_cutoff_hours,
        });
    }

    let cancelled =
        EnrollmentRepository::cancel(tx, enrollment.id, reason.as_deref(), actor, now)
            .await?
            .ok_or(SchedulingError::NotFound("Enrollment"))?;
    SessionCapacityLedger::release(tx, session.id, now).await?;
    PackageBalanceTracker::refund(tx, enrollment.package_purchase_id, now).await?;
    Ok(cancelled)
}

/// Session start as a UTC instant, interpreted in the trainer's timezone.
pub fn session_start_utc(
    session: &TrainingSession,
    config: Option<&AvailabilityConfig>,
) -> DateTime<Utc> {
    let tz = config.map(|c| c.tz()).unwrap_or(chrono_tz::Tz::UTC);
    local_to_utc(session.date, session.start_time, tz)
}

/// Session end as a UTC instant, interpreted in the trainer's timezone.
pub fn session_end_utc(
    session: &TrainingSession,
    config: Option<&AvailabilityConfig>,
) -> DateTime<Utc> {
    let tz = config.map(|c| c.tz()).unwrap_or(chrono_tz::Tz::UTC);
    local_to_utc(session.date, session.end_time, tz)
}

fn check_booking_window(
    session: &TrainingSession,
    config: Option<&AvailabilityConfig>,
    policy: SchedulingPolicy,
    now: DateTime<Utc>,
) -> SchedulingResult<()> {
    let min_notice = config
        .map(|c| i64::from(c.min_notice_hours))
        .unwrap_or(policy.default_min_notice_hours);
    let advance = config
        .map(|c| i64::from(c.advance_booking_days))
        .unwrap_or(policy.default_advance_booking_days);

    let start = session_start_utc(session, config);
    let lead = start - now;
    if lead < Duration::hours(min_notice) {
        return Err(SchedulingError::Validation(format!(
            "Enrollments need at least {min_notice} hours of notice"
        )));
    }
    if lead > Duration::days(advance) {
        return Err(SchedulingError::Validation(format!(
            "Enrollments open {advance} days before the session"
        )));
    }
    Ok(())
}
