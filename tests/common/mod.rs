#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use sqlx::types::Uuid;
use sqlx::SqlitePool;

use pawsched::db;
use pawsched::db::models::{
    AvailabilityConfig, NewPackagePurchase, Package, PackagePurchase, Pet, TrainingSession,
};
use pawsched::db::repositories::{
    AvailabilityRepository, PackageRepository, PetRepository, SessionRepository,
};
use pawsched::scheduling::PackageBalanceTracker;

pub async fn test_pool() -> SqlitePool {
    db::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database")
}

/// Wall-clock now truncated to whole seconds, so stored times round-trip
/// exactly.
pub fn now() -> DateTime<Utc> {
    Utc::now().with_nanosecond(0).unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Split a UTC instant into the (date, time) pair a session row stores.
pub fn split_utc(at: DateTime<Utc>) -> (NaiveDate, NaiveTime) {
    (at.naive_utc().date(), at.naive_utc().time())
}

/// Noon UTC `days` ahead of `base`: a session start that sits comfortably
/// inside the default booking window and never wraps past midnight.
pub fn midday(base: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    (base + chrono::Duration::days(days))
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn full_week_config(company_id: Uuid, trainer_id: Uuid) -> AvailabilityConfig {
    let created = now();
    AvailabilityConfig {
        id: Uuid::new_v4(),
        company_id,
        trainer_id,
        work_start: t(8, 0),
        work_end: t(20, 0),
        slot_duration_minutes: 60,
        lunch_break_start: None,
        lunch_break_end: None,
        break_start: None,
        break_end: None,
        working_days: "mon,tue,wed,thu,fri,sat,sun".into(),
        timezone: "UTC".into(),
        buffer_minutes: None,
        max_bookings_per_day: None,
        advance_booking_days: 30,
        min_notice_hours: 24,
        created_at: created,
        updated_at: created,
    }
}

pub async fn seed_config(pool: &SqlitePool, config: &AvailabilityConfig) -> AvailabilityConfig {
    let mut conn = pool.acquire().await.unwrap();
    AvailabilityRepository::upsert_config(&mut conn, config)
        .await
        .unwrap()
}

pub async fn seed_package(
    pool: &SqlitePool,
    company_id: Uuid,
    total_sessions: i32,
    validity_days: i32,
) -> Package {
    let created = now();
    let package = Package {
        id: Uuid::new_v4(),
        company_id,
        name: "Puppy basics".into(),
        description: None,
        total_sessions,
        price_cents: 19900,
        validity_days,
        active: true,
        created_at: created,
        updated_at: created,
    };
    let mut conn = pool.acquire().await.unwrap();
    PackageRepository::insert(&mut conn, &package).await.unwrap()
}

pub async fn seed_purchase(
    pool: &SqlitePool,
    company_id: Uuid,
    tutor_id: Uuid,
    package_id: Uuid,
    at: DateTime<Utc>,
) -> PackagePurchase {
    PackageBalanceTracker::purchase(
        pool,
        NewPackagePurchase {
            company_id,
            tutor_id,
            package_id,
        },
        at,
    )
    .await
    .unwrap()
}

pub async fn seed_pet(pool: &SqlitePool, company_id: Uuid, tutor_id: Uuid, name: &str) -> Pet {
    let created = now();
    let pet = Pet {
        id: Uuid::new_v4(),
        company_id,
        tutor_id,
        name: name.into(),
        breed: Some("Border Collie".into()),
        birth_date: None,
        created_at: created,
        updated_at: created,
    };
    let mut conn = pool.acquire().await.unwrap();
    PetRepository::insert(&mut conn, &pet).await.unwrap()
}

/// Ad-hoc session row, bypassing the HTTP-side availability checks.
#[allow(clippy::too_many_arguments)]
pub async fn seed_session(
    pool: &SqlitePool,
    company_id: Uuid,
    package_id: Uuid,
    trainer_id: Uuid,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    max_participants: i32,
) -> TrainingSession {
    let session = TrainingSession::new(
        company_id,
        None,
        package_id,
        trainer_id,
        date,
        start,
        end,
        max_participants,
        now(),
    );
    let mut conn = pool.acquire().await.unwrap();
    SessionRepository::insert(&mut conn, &session).await.unwrap();
    session
}

pub async fn session_by_id(pool: &SqlitePool, id: Uuid) -> TrainingSession {
    let mut conn = pool.acquire().await.unwrap();
    SessionRepository::find(&mut conn, id).await.unwrap().unwrap()
}

pub async fn purchase_by_id(pool: &SqlitePool, id: Uuid) -> PackagePurchase {
    let mut conn = pool.acquire().await.unwrap();
    pawsched::db::repositories::PurchaseRepository::find(&mut conn, id)
        .await
        .unwrap()
        .unwrap()
}
