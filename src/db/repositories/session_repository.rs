use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::types::Uuid;
use sqlx::SqliteConnection;

use crate::db::models::{SessionStatus, TrainingSession};

pub struct SessionRepository;

impl SessionRepository {
    /// Dedup insert for generated sessions: the unique index on
    /// `(template_id, date, start_time)` makes re-generation a no-op.
    /// Returns false when the slot already existed.
    pub async fn insert_generated(
        conn: &mut SqliteConnection,
        session: &TrainingSession,
    ) -> Result<bool, sqlx::Error> {
        let result = Self::insert_query(session, true).execute(conn).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        session: &TrainingSession,
    ) -> Result<(), sqlx::Error> {
        Self::insert_query(session, false).execute(conn).await?;
        Ok(())
    }

    fn insert_query(
        session: &TrainingSession,
        on_conflict_ignore: bool,
    ) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
        let sql = if on_conflict_ignore {
            r#"
            INSERT INTO training_sessions (
                id, session_key, company_id, template_id, package_id,
                trainer_id, date, start_time, end_time, max_participants,
                available_slots, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (template_id, date, start_time) DO NOTHING
            "#
        } else {
            r#"
            INSERT INTO training_sessions (
                id, session_key, company_id, template_id, package_id,
                trainer_id, date, start_time, end_time, max_participants,
                available_slots, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        };
        sqlx::query(sql)
            .bind(session.id)
            .bind(session.session_key)
            .bind(session.company_id)
            .bind(session.template_id)
            .bind(session.package_id)
            .bind(session.trainer_id)
            .bind(session.date)
            .bind(session.start_time)
            .bind(session.end_time)
            .bind(session.max_participants)
            .bind(session.available_slots)
            .bind(session.status)
            .bind(session.created_at)
            .bind(session.updated_at)
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        id: Uuid,
    ) -> Result<Option<TrainingSession>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSession>("SELECT * FROM training_sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn find_by_key(
        conn: &mut SqliteConnection,
        session_key: Uuid,
    ) -> Result<Option<TrainingSession>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSession>(
            "SELECT * FROM training_sessions WHERE session_key = ?",
        )
        .bind(session_key)
        .fetch_optional(conn)
        .await
    }

    pub async fn list_for_trainer(
        conn: &mut SqliteConnection,
        trainer_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrainingSession>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSession>(
            r#"
            SELECT * FROM training_sessions
            WHERE trainer_id = ? AND date >= ? AND date <= ?
            ORDER BY date, start_time
            "#,
        )
        .bind(trainer_id)
        .bind(from)
        .bind(to)
        .fetch_all(conn)
        .await
    }

    /// Live sessions of the trainer on `date` overlapping `[start, end)`.
    pub async fn count_overlapping(
        conn: &mut SqliteConnection,
        trainer_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM training_sessions
            WHERE trainer_id = ? AND date = ?
              AND status NOT IN ('cancelled', 'expired')
              AND start_time < ? AND end_time > ?
            "#,
        )
        .bind(trainer_id)
        .bind(date)
        .bind(end)
        .bind(start)
        .fetch_one(conn)
        .await
    }

    /// Move a session to `status`, stamping the matching `*_at` column once.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: Uuid,
        status: SessionStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<TrainingSession>, sqlx::Error> {
        let stamp = match status {
            SessionStatus::Confirmed => Some("confirmed_at"),
            SessionStatus::InProgress => Some("started_at"),
            SessionStatus::Completed => Some("completed_at"),
            SessionStatus::Cancelled => Some("cancelled_at"),
            SessionStatus::Expired => Some("expired_at"),
            SessionStatus::NoShow => Some("no_show_at"),
            SessionStatus::Scheduled => None,
        };
        match stamp {
            Some(col) => {
                let sql = format!(
                    "UPDATE training_sessions SET status = ?, {col} = COALESCE({col}, ?), \
                     updated_at = ? WHERE id = ? RETURNING *"
                );
                sqlx::query_as::<_, TrainingSession>(&sql)
                    .bind(status)
                    .bind(now)
                    .bind(now)
                    .bind(id)
                    .fetch_optional(conn)
                    .await
            }
            None => {
                sqlx::query_as::<_, TrainingSession>(
                    "UPDATE training_sessions SET status = ?, updated_at = ? WHERE id = ? \
                     RETURNING *",
                )
                .bind(status)
                .bind(now)
                .bind(id)
                .fetch_optional(conn)
                .await
            }
        }
    }

    /// Guarded check-and-decrement; returns false when the session is full.
    pub async fn reserve_slot(
        conn: &mut SqliteConnection,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE training_sessions
            SET available_slots = available_slots - 1, updated_at = ?
            WHERE id = ? AND available_slots > 0
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment capped at max_participants, so a double release cannot push
    /// capacity past the limit.
    pub async fn release_slot(
        conn: &mut SqliteConnection,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE training_sessions
            SET available_slots = MIN(available_slots + 1, max_participants), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Non-terminal sessions due for a time-based transition at `now`'s date
    /// horizon (a day of slack covers timezone skew either way).
    pub async fn list_due_for_sweep(
        conn: &mut SqliteConnection,
        horizon: NaiveDate,
    ) -> Result<Vec<TrainingSession>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSession>(
            r#"
            SELECT * FROM training_sessions
            WHERE status IN ('scheduled', 'confirmed', 'in_progress') AND date <= ?
            ORDER BY date, start_time
            "#,
        )
        .bind(horizon)
        .fetch_all(conn)
        .await
    }
}
