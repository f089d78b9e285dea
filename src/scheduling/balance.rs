use chrono::{DateTime, Duration, Utc};
use sqlx::types::Uuid;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{NewPackagePurchase, PackagePurchase, PurchaseStatus};
use crate::db::repositories::{PackageRepository, PurchaseRepository};
use crate::scheduling::error::{SchedulingError, SchedulingResult};

/// Tracks a tutor's purchased session balance. Consume and refund are
/// guarded single-row updates; `used_sessions` can never leave
/// `[0, total_sessions]`.
pub struct PackageBalanceTracker;

impl PackageBalanceTracker {
    /// Create a purchase from an active package, snapshotting the session
    /// total and computing the expiry from the package's validity window.
    pub async fn purchase(
        pool: &SqlitePool,
        payload: NewPackagePurchase,
        now: DateTime<Utc>,
    ) -> SchedulingResult<PackagePurchase> {
        let mut conn = pool.acquire().await?;
        let package = PackageRepository::find(&mut conn, payload.package_id)
            .await?
            .ok_or(SchedulingError::NotFound("Package"))?;
        if !package.active {
            return Err(SchedulingError::Validation(
                "Package is no longer offered".into(),
            ));
        }

        let purchase = PackagePurchase {
            id: Uuid::new_v4(),
            company_id: payload.company_id,
            tutor_id: payload.tutor_id,
            package_id: package.id,
            purchase_date: now,
            total_sessions: package.total_sessions,
            used_sessions: 0,
            expires_at: now + Duration::days(i64::from(package.validity_days)),
            status: PurchaseStatus::Active,
            created_at: now,
            updated_at: now,
        };
        Ok(PurchaseRepository::insert(&mut conn, &purchase).await?)
    }

    /// The purchase an enrollment should debit, if any.
    pub async fn active_purchase(
        conn: &mut SqliteConnection,
        tutor_id: Uuid,
        package_id: Uuid,
        now: DateTime<Utc>,
    ) -> SchedulingResult<Option<PackagePurchase>> {
        Ok(PurchaseRepository::find_active(conn, tutor_id, package_id, now).await?)
    }

    pub async fn consume(
        conn: &mut SqliteConnection,
        purchase_id: Uuid,
        now: DateTime<Utc>,
    ) -> SchedulingResult<()> {
        if PurchaseRepository::consume(conn, purchase_id, now).await? {
            Ok(())
        } else {
            Err(SchedulingError::InsufficientSessions)
        }
    }

    /// Give one session back to the purchase the enrollment was debited
    /// from. Refunding an already-empty purchase is a no-op, never negative.
    pub async fn refund(
        conn: &mut SqliteConnection,
        purchase_id: Uuid,
        now: DateTime<Utc>,
    ) -> SchedulingResult<()> {
        PurchaseRepository::refund(conn, purchase_id, now).await?;
        Ok(())
    }
}
