use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Uuid;
use sqlx::SqliteConnection;

use crate::db::models::{CancelActor, EnrollmentStatus, TrainingSessionEnrollment};

pub struct EnrollmentRepository;

impl EnrollmentRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        enrollment: &TrainingSessionEnrollment,
    ) -> Result<TrainingSessionEnrollment, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionEnrollment>(
            r#"
            INSERT INTO training_session_enrollments (
                id, company_id, training_session_id, tutor_id, pet_id,
                package_purchase_id, status, enrolled_at, confirmation_token,
                cancellation_token, cancellation_reason, cancelled_by,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(enrollment.id)
        .bind(enrollment.company_id)
        .bind(enrollment.training_session_id)
        .bind(enrollment.tutor_id)
        .bind(enrollment.pet_id)
        .bind(enrollment.package_purchase_id)
        .bind(enrollment.status)
        .bind(enrollment.enrolled_at)
        .bind(enrollment.confirmation_token)
        .bind(enrollment.cancellation_token)
        .bind(&enrollment.cancellation_reason)
        .bind(enrollment.cancelled_by)
        .bind(enrollment.created_at)
        .bind(enrollment.updated_at)
        .fetch_one(conn)
        .await
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        id: Uuid,
    ) -> Result<Option<TrainingSessionEnrollment>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionEnrollment>(
            "SELECT * FROM training_session_enrollments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn find_by_confirmation_token(
        conn: &mut SqliteConnection,
        token: Uuid,
    ) -> Result<Option<TrainingSessionEnrollment>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionEnrollment>(
            "SELECT * FROM training_session_enrollments WHERE confirmation_token = ?",
        )
        .bind(token)
        .fetch_optional(conn)
        .await
    }

    pub async fn find_by_cancellation_token(
        conn: &mut SqliteConnection,
        token: Uuid,
    ) -> Result<Option<TrainingSessionEnrollment>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionEnrollment>(
            "SELECT * FROM training_session_enrollments WHERE cancellation_token = ?",
        )
        .bind(token)
        .fetch_optional(conn)
        .await
    }

    /// The pet's live enrollment in this session, if any. Cancelled rows do
    /// not count; a pet may re-enroll after cancelling.
    pub async fn find_active_for_pet(
        conn: &mut SqliteConnection,
        training_session_id: Uuid,
        pet_id: Uuid,
    ) -> Result<Option<TrainingSessionEnrollment>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionEnrollment>(
            r#"
            SELECT * FROM training_session_enrollments
            WHERE training_session_id = ? AND pet_id = ? AND status <> 'cancelled'
            "#,
        )
        .bind(training_session_id)
        .bind(pet_id)
        .fetch_optional(conn)
        .await
    }

    pub async fn count_holding_slots(
        conn: &mut SqliteConnection,
        training_session_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM training_session_enrollments
            WHERE training_session_id = ? AND status <> 'cancelled'
            "#,
        )
        .bind(training_session_id)
        .fetch_one(conn)
        .await
    }

    pub async fn count_checked_in(
        conn: &mut SqliteConnection,
        training_session_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM training_session_enrollments
            WHERE training_session_id = ? AND status = 'checked_in'
            "#,
        )
        .bind(training_session_id)
        .fetch_one(conn)
        .await
    }

    /// Live enrollments across all of a trainer's sessions on one date, for
    /// the per-day booking cap.
    pub async fn count_for_trainer_on(
        conn: &mut SqliteConnection,
        trainer_id: Uuid,
        date: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM training_session_enrollments e
            JOIN training_sessions s ON s.id = e.training_session_id
            WHERE s.trainer_id = ? AND s.date = ? AND e.status <> 'cancelled'
            "#,
        )
        .bind(trainer_id)
        .bind(date)
        .fetch_one(conn)
        .await
    }

    /// Move an enrollment to `status`, stamping the matching `*_at` column
    /// once.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: Uuid,
        status: EnrollmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<TrainingSessionEnrollment>, sqlx::Error> {
        let stamp = match status {
            EnrollmentStatus::Confirmed => Some("confirmed_at"),
            EnrollmentStatus::CheckedIn => Some("checked_in_at"),
            EnrollmentStatus::Cancelled => Some("cancelled_at"),
            EnrollmentStatus::NoShow => Some("no_show_at"),
            EnrollmentStatus::Pending | EnrollmentStatus::Enrolled => None,
        };
        match stamp {
            Some(col) => {
                let sql = format!(
                    "UPDATE training_session_enrollments SET status = ?, \
                     {col} = COALESCE({col}, ?), updated_at = ? WHERE id = ? RETURNING *"
                );
                sqlx::query_as::<_, TrainingSessionEnrollment>(&sql)
                    .bind(status)
                    .bind(now)
                    .bind(now)
                    .bind(id)
                    .fetch_optional(conn)
                    .await
            }
            None => {
                sqlx::query_as::<_, TrainingSessionEnrollment>(
                    "UPDATE training_session_enrollments SET status = ?, updated_at = ? \
                     WHERE id = ? RETURNING *",
                )
                .bind(status)
                .bind(now)
                .bind(id)
                .fetch_optional(conn)
                .await
            }
        }
    }

    pub async fn cancel(
        conn: &mut SqliteConnection,
        id: Uuid,
        reason: Option<&str>,
        actor: CancelActor,
        now: DateTime<Utc>,
    ) -> Result<Option<TrainingSessionEnrollment>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionEnrollment>(
            r#"
            UPDATE training_session_enrollments
            SET status = 'cancelled',
                cancelled_at = COALESCE(cancelled_at, ?),
                cancellation_reason = ?,
                cancelled_by = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(reason)
        .bind(actor)
        .bind(now)
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn list_for_session(
        conn: &mut SqliteConnection,
        training_session_id: Uuid,
    ) -> Result<Vec<TrainingSessionEnrollment>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionEnrollment>(
            r#"
            SELECT * FROM training_session_enrollments
            WHERE training_session_id = ?
            ORDER BY enrolled_at
            "#,
        )
        .bind(training_session_id)
        .fetch_all(conn)
        .await
    }
}
