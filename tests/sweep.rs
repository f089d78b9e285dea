mod common;

use chrono::Duration;
use sqlx::types::Uuid;

use common::*;
use pawsched::db::models::{NewEnrollment, PurchaseStatus, SessionStatus};
use pawsched::scheduling::{sweep, EnrollmentLifecycle, SchedulingPolicy};

#[tokio::test]
async fn empty_scheduled_session_expires_after_start() {
    let pool = test_pool().await;
    let company = Uuid::new_v4();
    let package = seed_package(&pool, company, 10, 365).await;
    let base = now();

    let session_start = midday(base, 3);
    let (date, start) = split_utc(session_start);
    let session = seed_session(
        &pool,
        company,
        package.id,
        Uuid::new_v4(),
        date,
        start,
        start + Duration::hours(1),
        5,
    )
    .await;

    // Before start nothing moves.
    let report = sweep::run_once(&pool, session_start - Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(report.expired_sessions, 0);
    assert_eq!(session_by_id(&pool, session.id).await.status, SessionStatus::Scheduled);

    let report = sweep::run_once(&pool, session_start + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(report.expired_sessions, 1);
    let expired = session_by_id(&pool, session.id).await;
    assert_eq!(expired.status, SessionStatus::Expired);
    assert!(expired.expired_at.is_some());
}

#[tokio::test]
async fn session_lifecycle_through_the_sweep() {
    let pool = test_pool().await;
    let company = Uuid::new_v4();
    let package = seed_package(&pool, company, 10, 365).await;
    let trainer = Uuid::new_v4();
    let tutor = Uuid::new_v4();
    let pet = seed_pet(&pool, company, tutor, "Vito").await;
    let base = now();
    seed_purchase(&pool, company, tutor, package.id, base).await;
    let policy = SchedulingPolicy::default();

    let session_start = midday(base, 3);
    let (date, start) = split_utc(session_start);
    let session = seed_session(
        &pool,
        company,
        package.id,
        trainer,
        date,
        start,
        start + Duration::hours(1),
        5,
    )
    .await;

    let enrollment = EnrollmentLifecycle::enroll(
        &pool,
        policy,
        &NewEnrollment {
            company_id: company,
            training_session_id: session.id,
            tutor_id: tutor,
            pet_id: pet.id,
        },
        base,
    )
    .await
    .unwrap();
    EnrollmentLifecycle::confirm_by_token(&pool, enrollment.confirmation_token, base)
        .await
        .unwrap();
    assert_eq!(session_by_id(&pool, session.id).await.status, SessionStatus::Confirmed);

    // Past start: confirmed -> in_progress.
    let report = sweep::run_once(&pool, session_start + Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(report.started_sessions, 1);
    assert_eq!(session_by_id(&pool, session.id).await.status, SessionStatus::InProgress);

    // Past end: in_progress -> completed.
    let report = sweep::run_once(&pool, session_start + Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(report.completed_sessions, 1);
    let done = session_by_id(&pool, session.id).await;
    assert_eq!(done.status, SessionStatus::Completed);
    assert!(done.started_at.is_some());
    assert!(done.completed_at.is_some());
}

#[tokio::test]
async fn confirmed_session_with_no_check_ins_becomes_no_show() {
    let pool = test_pool().await;
    let company = Uuid::new_v4();
    let package = seed_package(&pool, company, 10, 365).await;
    let trainer = Uuid::new_v4();
    let tutor = Uuid::new_v4();
    let pet = seed_pet(&pool, company, tutor, "Gala").await;
    let base = now();
    seed_purchase(&pool, company, tutor, package.id, base).await;
    let policy = SchedulingPolicy::default();

    let session_start = midday(base, 3);
    let (date, start) = split_utc(session_start);
    let session = seed_session(
        &pool,
        company,
        package.id,
        trainer,
        date,
        start,
        start + Duration::hours(1),
        5,
    )
    .await;

    let enrollment = EnrollmentLifecycle::enroll(
        &pool,
        policy,
        &NewEnrollment {
            company_id: company,
            training_session_id: session.id,
            tutor_id: tutor,
            pet_id: pet.id,
        },
        base,
    )
    .await
    .unwrap();
    EnrollmentLifecycle::confirm_by_token(&pool, enrollment.confirmation_token, base)
        .await
        .unwrap();

    // The whole session elapsed with nobody checked in.
    let report = sweep::run_once(&pool, session_start + Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(report.no_show_sessions, 1);
    assert_eq!(session_by_id(&pool, session.id).await.status, SessionStatus::NoShow);
}

#[tokio::test]
async fn enrolled_but_unconfirmed_session_still_runs() {
    let pool = test_pool().await;
    let company = Uuid::new_v4();
    let package = seed_package(&pool, company, 10, 365).await;
    let tutor = Uuid::new_v4();
    let pet = seed_pet(&pool, company, tutor, "Mika").await;
    let base = now();
    seed_purchase(&pool, company, tutor, package.id, base).await;

    let session_start = midday(base, 3);
    let (date, start) = split_utc(session_start);
    let session = seed_session(
        &pool,
        company,
        package.id,
        Uuid::new_v4(),
        date,
        start,
        start + Duration::hours(1),
        5,
    )
    .await;

    EnrollmentLifecycle::enroll(
        &pool,
        SchedulingPolicy::default(),
        &NewEnrollment {
            company_id: company,
            training_session_id: session.id,
            tutor_id: tutor,
            pet_id: pet.id,
        },
        base,
    )
    .await
    .unwrap();

    let report = sweep::run_once(&pool, session_start + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(report.started_sessions, 1);
    assert_eq!(report.expired_sessions, 0);
    assert_eq!(session_by_id(&pool, session.id).await.status, SessionStatus::InProgress);
}

#[tokio::test]
async fn lapsed_purchases_expire() {
    let pool = test_pool().await;
    let company = Uuid::new_v4();
    let package = seed_package(&pool, company, 10, 7).await;
    let tutor = Uuid::new_v4();
    let base = now();
    let purchase = seed_purchase(&pool, company, tutor, package.id, base).await;

    let report = sweep::run_once(&pool, base + Duration::days(8)).await.unwrap();
    assert_eq!(report.expired_purchases, 1);
    assert_eq!(
        purchase_by_id(&pool, purchase.id).await.status,
        PurchaseStatus::Expired
    );

    // Already expired rows are not touched twice.
    let report = sweep::run_once(&pool, base + Duration::days(9)).await.unwrap();
    assert_eq!(report.expired_purchases, 0);
}
