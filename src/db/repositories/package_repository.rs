use sqlx::types::Uuid;
use sqlx::SqliteConnection;

use crate::db::models::Package;

pub struct PackageRepository;

impl PackageRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        package: &Package,
    ) -> Result<Package, sqlx::Error> {
        sqlx::query_as::<_, Package>(
            r#"
            INSERT INTO packages (
                id, company_id, name, description, total_sessions, price_cents,
                validity_days, active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(package.id)
        .bind(package.company_id)
        .bind(&package.name)
        .bind(&package.description)
        .bind(package.total_sessions)
        .bind(package.price_cents)
        .bind(package.validity_days)
        .bind(package.active)
        .bind(package.created_at)
        .bind(package.updated_at)
        .fetch_one(conn)
        .await
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        id: Uuid,
    ) -> Result<Option<Package>, sqlx::Error> {
        sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list_for_company(
        conn: &mut SqliteConnection,
        company_id: Uuid,
    ) -> Result<Vec<Package>, sqlx::Error> {
        sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE company_id = ? ORDER BY name")
            .bind(company_id)
            .fetch_all(conn)
            .await
    }
}
