use chrono::NaiveDate;
use sqlx::types::Uuid;
use sqlx::SqliteConnection;

use crate::db::models::{AvailabilityConfig, AvailabilityException};

pub struct AvailabilityRepository;

impl AvailabilityRepository {
    /// Insert-or-replace the trainer's recurring config. The row id and
    /// created_at of an existing config are preserved.
    pub async fn upsert_config(
        conn: &mut SqliteConnection,
        config: &AvailabilityConfig,
    ) -> Result<AvailabilityConfig, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityConfig>(
            r#"
            INSERT INTO availability_configs (
                id, company_id, trainer_id, work_start, work_end,
                slot_duration_minutes, lunch_break_start, lunch_break_end,
                break_start, break_end, working_days, timezone, buffer_minutes,
                max_bookings_per_day, advance_booking_days, min_notice_hours,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (trainer_id) DO UPDATE SET
                work_start = excluded.work_start,
                work_end = excluded.work_end,
                slot_duration_minutes = excluded.slot_duration_minutes,
                lunch_break_start = excluded.lunch_break_start,
                lunch_break_end = excluded.lunch_break_end,
                break_start = excluded.break_start,
                break_end = excluded.break_end,
                working_days = excluded.working_days,
                timezone = excluded.timezone,
                buffer_minutes = excluded.buffer_minutes,
                max_bookings_per_day = excluded.max_bookings_per_day,
                advance_booking_days = excluded.advance_booking_days,
                min_notice_hours = excluded.min_notice_hours,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(config.id)
        .bind(config.company_id)
        .bind(config.trainer_id)
        .bind(config.work_start)
        .bind(config.work_end)
        .bind(config.slot_duration_minutes)
        .bind(config.lunch_break_start)
        .bind(config.lunch_break_end)
        .bind(config.break_start)
        .bind(config.break_end)
        .bind(&config.working_days)
        .bind(&config.timezone)
        .bind(config.buffer_minutes)
        .bind(config.max_bookings_per_day)
        .bind(config.advance_booking_days)
        .bind(config.min_notice_hours)
        .bind(config.created_at)
        .bind(config.updated_at)
        .fetch_one(conn)
        .await
    }

    pub async fn find_config(
        conn: &mut SqliteConnection,
        trainer_id: Uuid,
    ) -> Result<Option<AvailabilityConfig>, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityConfig>(
            "SELECT * FROM availability_configs WHERE trainer_id = ?",
        )
        .bind(trainer_id)
        .fetch_optional(conn)
        .await
    }

    pub async fn delete_config(
        conn: &mut SqliteConnection,
        trainer_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM availability_configs WHERE trainer_id = ?")
            .bind(trainer_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn upsert_exception(
        conn: &mut SqliteConnection,
        exception: &AvailabilityException,
    ) -> Result<AvailabilityException, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityException>(
            r#"
            INSERT INTO availability_exceptions (
                id, company_id, trainer_id, date, kind, custom_start,
                custom_end, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (trainer_id, date) DO UPDATE SET
                kind = excluded.kind,
                custom_start = excluded.custom_start,
                custom_end = excluded.custom_end
            RETURNING *
            "#,
        )
        .bind(exception.id)
        .bind(exception.company_id)
        .bind(exception.trainer_id)
        .bind(exception.date)
        .bind(exception.kind)
        .bind(exception.custom_start)
        .bind(exception.custom_end)
        .bind(exception.created_at)
        .fetch_one(conn)
        .await
    }

    pub async fn list_exceptions(
        conn: &mut SqliteConnection,
        trainer_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AvailabilityException>, sqlx::Error> {
        sqlx::query_as::<_, AvailabilityException>(
            r#"
            SELECT * FROM availability_exceptions
            WHERE trainer_id = ? AND date >= ? AND date <= ?
            ORDER BY date
            "#,
        )
        .bind(trainer_id)
        .bind(from)
        .bind(to)
        .fetch_all(conn)
        .await
    }

    pub async fn delete_exception(
        conn: &mut SqliteConnection,
        trainer_id: Uuid,
        date: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM availability_exceptions WHERE trainer_id = ? AND date = ?")
                .bind(trainer_id)
                .bind(date)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }
}
