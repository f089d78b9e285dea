use chrono::{DateTime, Utc};
use sqlx::types::Uuid;
use sqlx::SqliteConnection;

use crate::db::models::PackagePurchase;

pub struct PurchaseRepository;

impl PurchaseRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        purchase: &PackagePurchase,
    ) -> Result<PackagePurchase, sqlx::Error> {
        sqlx::query_as::<_, PackagePurchase>(
            r#"
            INSERT INTO package_purchases (
                id, company_id, tutor_id, package_id, purchase_date,
                total_sessions, used_sessions, expires_at, status,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(purchase.id)
        .bind(purchase.company_id)
        .bind(purchase.tutor_id)
        .bind(purchase.package_id)
        .bind(purchase.purchase_date)
        .bind(purchase.total_sessions)
        .bind(purchase.used_sessions)
        .bind(purchase.expires_at)
        .bind(purchase.status)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .fetch_one(conn)
        .await
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        id: Uuid,
    ) -> Result<Option<PackagePurchase>, sqlx::Error> {
        sqlx::query_as::<_, PackagePurchase>("SELECT * FROM package_purchases WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// The purchase an enrollment should debit: active, unexpired, with
    /// balance left. Earliest expiry first so balances drain before they
    /// lapse.
    pub async fn find_active(
        conn: &mut SqliteConnection,
        tutor_id: Uuid,
        package_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PackagePurchase>, sqlx::Error> {
        sqlx::query_as::<_, PackagePurchase>(
            r#"
            SELECT * FROM package_purchases
            WHERE tutor_id = ? AND package_id = ? AND status = 'active'
              AND expires_at > ? AND used_sessions < total_sessions
            ORDER BY expires_at
            LIMIT 1
            "#,
        )
        .bind(tutor_id)
        .bind(package_id)
        .bind(now)
        .fetch_optional(conn)
        .await
    }

    /// Guarded consume of one session; flips the purchase to `used` at the
    /// cap. Returns false when there was no balance to take.
    pub async fn consume(
        conn: &mut SqliteConnection,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE package_purchases
            SET used_sessions = used_sessions + 1,
                status = CASE
                    WHEN used_sessions + 1 >= total_sessions THEN 'used'
                    ELSE status
                END,
                updated_at = ?
            WHERE id = ? AND status = 'active' AND used_sessions < total_sessions
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Guarded refund of one session, floored at zero; a fully-used purchase
    /// becomes active again.
    pub async fn refund(
        conn: &mut SqliteConnection,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE package_purchases
            SET used_sessions = used_sessions - 1,
                status = CASE WHEN status = 'used' THEN 'active' ELSE status END,
                updated_at = ?
            WHERE id = ? AND used_sessions > 0
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn expire_due(
        conn: &mut SqliteConnection,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE package_purchases
            SET status = 'expired', updated_at = ?
            WHERE status = 'active' AND expires_at <= ?
            "#,
        )
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_for_tutor(
        conn: &mut SqliteConnection,
        tutor_id: Uuid,
    ) -> Result<Vec<PackagePurchase>, sqlx::Error> {
        sqlx::query_as::<_, PackagePurchase>(
            "SELECT * FROM package_purchases WHERE tutor_id = ? ORDER BY purchase_date DESC",
        )
        .bind(tutor_id)
        .fetch_all(conn)
        .await
    }
}
