use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Active,
    Expired,
    Used,
}

/// A sellable bundle of N training sessions.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_sessions: i32,
    pub price_cents: i64,
    pub validity_days: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPackage {
    pub company_id: Uuid,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub total_sessions: i32,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(range(min = 1, max = 1095))]
    pub validity_days: i32,
}

/// One tutor's purchase of a package. `total_sessions` is snapshotted at
/// purchase time so the balance ledger is a single self-contained row.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PackagePurchase {
    pub id: Uuid,
    pub company_id: Uuid,
    pub tutor_id: Uuid,
    pub package_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub total_sessions: i32,
    pub used_sessions: i32,
    pub expires_at: DateTime<Utc>,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PackagePurchase {
    pub fn remaining_sessions(&self) -> i32 {
        self.total_sessions - self.used_sessions
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPackagePurchase {
    pub company_id: Uuid,
    pub tutor_id: Uuid,
    pub package_id: Uuid,
}
