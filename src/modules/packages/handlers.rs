use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use sqlx::types::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{NewPackage, NewPackagePurchase, Package, PackagePurchase};
use crate::db::repositories::{PackageRepository, PurchaseRepository};
use crate::error::{AppError, AppResult};
use crate::scheduling::PackageBalanceTracker;

pub async fn create_package(
    State(state): State<AppState>,
    Json(payload): Json<NewPackage>,
) -> AppResult<Json<Package>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let now = Utc::now();
    let package = Package {
        id: Uuid::new_v4(),
        company_id: payload.company_id,
        name: payload.name,
        description: payload.description,
        total_sessions: payload.total_sessions,
        price_cents: payload.price_cents,
        validity_days: payload.validity_days,
        active: true,
        created_at: now,
        updated_at: now,
    };
    let mut conn = state.db.acquire().await?;
    let package = PackageRepository::insert(&mut conn, &package).await?;
    Ok(Json(package))
}

pub async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Package>> {
    let mut conn = state.db.acquire().await?;
    let package = PackageRepository::find(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package".into()))?;
    Ok(Json(package))
}

pub async fn list_packages_for_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<Package>>> {
    let mut conn = state.db.acquire().await?;
    let packages = PackageRepository::list_for_company(&mut conn, company_id).await?;
    Ok(Json(packages))
}

/// Record a tutor's purchase. Payment itself happens upstream; by the time
/// this is called the money has moved.
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(payload): Json<NewPackagePurchase>,
) -> AppResult<Json<PackagePurchase>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let purchase = PackageBalanceTracker::purchase(&state.db, payload, Utc::now()).await?;
    Ok(Json(purchase))
}

pub async fn list_purchases_for_tutor(
    State(state): State<AppState>,
    Path(tutor_id): Path<Uuid>,
) -> AppResult<Json<Vec<PackagePurchase>>> {
    let mut conn = state.db.acquire().await?;
    let purchases = PurchaseRepository::list_for_tutor(&mut conn, tutor_id).await?;
    Ok(Json(purchases))
}
