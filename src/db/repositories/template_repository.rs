use chrono::{DateTime, Utc};
use sqlx::types::Uuid;
use sqlx::SqliteConnection;

use crate::db::models::{TemplateStatus, TrainingSessionTemplate};

pub struct TemplateRepository;

impl TemplateRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        template: &TrainingSessionTemplate,
    ) -> Result<TrainingSessionTemplate, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionTemplate>(
            r#"
            INSERT INTO training_session_templates (
                id, company_id, package_id, trainer_id, start_time, end_time,
                max_participants, recurrence, weekdays, start_date, end_date,
                status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(template.id)
        .bind(template.company_id)
        .bind(template.package_id)
        .bind(template.trainer_id)
        .bind(template.start_time)
        .bind(template.end_time)
        .bind(template.max_participants)
        .bind(template.recurrence)
        .bind(&template.weekdays)
        .bind(template.start_date)
        .bind(template.end_date)
        .bind(template.status)
        .bind(template.created_at)
        .bind(template.updated_at)
        .fetch_one(conn)
        .await
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        id: Uuid,
    ) -> Result<Option<TrainingSessionTemplate>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionTemplate>(
            "SELECT * FROM training_session_templates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: Uuid,
        status: TemplateStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<TrainingSessionTemplate>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionTemplate>(
            r#"
            UPDATE training_session_templates
            SET status = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(now)
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn list_for_trainer(
        conn: &mut SqliteConnection,
        trainer_id: Uuid,
    ) -> Result<Vec<TrainingSessionTemplate>, sqlx::Error> {
        sqlx::query_as::<_, TrainingSessionTemplate>(
            r#"
            SELECT * FROM training_session_templates
            WHERE trainer_id = ?
            ORDER BY start_date, start_time
            "#,
        )
        .bind(trainer_id)
        .fetch_all(conn)
        .await
    }
}
