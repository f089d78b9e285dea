mod common;

use chrono::Utc;
use sqlx::types::Uuid;
use sqlx::SqlitePool;

use common::*;
use pawsched::db::models::{
    AvailabilityException, ExceptionKind, Recurrence, SessionStatus, TemplateStatus,
    TrainingSessionTemplate,
};
use pawsched::db::repositories::{AvailabilityRepository, TemplateRepository};
use pawsched::scheduling::slots::SkipReason;
use pawsched::scheduling::{SchedulingError, SlotGenerator};

async fn seed_template(
    pool: &SqlitePool,
    trainer_id: Uuid,
    recurrence: Recurrence,
    weekdays: Option<&str>,
) -> TrainingSessionTemplate {
    let created = now();
    let template = TrainingSessionTemplate {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        package_id: Uuid::new_v4(),
        trainer_id,
        start_time: t(10, 0),
        end_time: t(11, 0),
        max_participants: 6,
        recurrence,
        weekdays: weekdays.map(Into::into),
        start_date: d(2025, 1, 1),
        end_date: d(2025, 12, 31),
        status: TemplateStatus::Active,
        created_at: created,
        updated_at: created,
    };
    let mut conn = pool.acquire().await.unwrap();
    TemplateRepository::insert(&mut conn, &template).await.unwrap()
}

#[tokio::test]
async fn weekly_template_generates_expected_dates_and_is_idempotent() {
    let pool = test_pool().await;
    let trainer = Uuid::new_v4();
    seed_config(&pool, &full_week_config(Uuid::new_v4(), trainer)).await;
    let template = seed_template(&pool, trainer, Recurrence::Weekly, Some("mon,wed")).await;

    let report = SlotGenerator::generate(&pool, template.id, d(2025, 1, 6), d(2025, 1, 17), now())
        .await
        .unwrap();

    let mut dates: Vec<_> = report.created.iter().map(|s| s.date).collect();
    dates.sort();
    assert_eq!(
        dates,
        vec![d(2025, 1, 6), d(2025, 1, 8), d(2025, 1, 13), d(2025, 1, 15)]
    );
    assert!(report.skipped.is_empty());
    for session in &report.created {
        assert_eq!(session.status, SessionStatus::Scheduled);
        assert_eq!(session.available_slots, session.max_participants);
        assert_eq!(session.template_id, Some(template.id));
    }

    // Second run over the same range: nothing new, everything reported as
    // already generated.
    let again = SlotGenerator::generate(&pool, template.id, d(2025, 1, 6), d(2025, 1, 17), now())
        .await
        .unwrap();
    assert!(again.created.is_empty());
    assert_eq!(again.skipped.len(), 4);
    assert!(again
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::Duplicate));

    // Partially overlapping range: only the genuinely new date materializes.
    let extended =
        SlotGenerator::generate(&pool, template.id, d(2025, 1, 13), d(2025, 1, 20), now())
            .await
            .unwrap();
    let new_dates: Vec<_> = extended.created.iter().map(|s| s.date).collect();
    assert_eq!(new_dates, vec![d(2025, 1, 20)]);
    assert_eq!(extended.skipped.len(), 2);
    assert!(extended
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::Duplicate));
}

#[tokio::test]
async fn blocked_exception_skips_a_matching_weekday() {
    let pool = test_pool().await;
    let trainer = Uuid::new_v4();
    let config = seed_config(&pool, &full_week_config(Uuid::new_v4(), trainer)).await;
    let template = seed_template(&pool, trainer, Recurrence::Weekly, Some("mon,wed")).await;

    let exception = AvailabilityException {
        id: Uuid::new_v4(),
        company_id: config.company_id,
        trainer_id: trainer,
        date: d(2025, 1, 8),
        kind: ExceptionKind::Blocked,
        custom_start: None,
        custom_end: None,
        created_at: Utc::now(),
    };
    let mut conn = pool.acquire().await.unwrap();
    AvailabilityRepository::upsert_exception(&mut conn, &exception)
        .await
        .unwrap();
    drop(conn);

    let report = SlotGenerator::generate(&pool, template.id, d(2025, 1, 6), d(2025, 1, 17), now())
        .await
        .unwrap();

    let dates: Vec<_> = report.created.iter().map(|s| s.date).collect();
    assert!(!dates.contains(&d(2025, 1, 8)));
    assert_eq!(dates.len(), 3);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].date, d(2025, 1, 8));
    assert_eq!(report.skipped[0].reason, SkipReason::Unavailable);
}

#[tokio::test]
async fn trainer_without_config_generates_nothing() {
    let pool = test_pool().await;
    let trainer = Uuid::new_v4();
    let template = seed_template(&pool, trainer, Recurrence::Weekly, Some("mon,wed")).await;

    let report = SlotGenerator::generate(&pool, template.id, d(2025, 1, 6), d(2025, 1, 17), now())
        .await
        .unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.skipped.len(), 4);
    assert!(report
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::Unavailable));
}

#[tokio::test]
async fn inactive_template_is_rejected() {
    let pool = test_pool().await;
    let trainer = Uuid::new_v4();
    seed_config(&pool, &full_week_config(Uuid::new_v4(), trainer)).await;
    let template = seed_template(&pool, trainer, Recurrence::Daily, None).await;

    let mut conn = pool.acquire().await.unwrap();
    TemplateRepository::set_status(&mut conn, template.id, TemplateStatus::Inactive, now())
        .await
        .unwrap();
    drop(conn);

    let err = SlotGenerator::generate(&pool, template.id, d(2025, 1, 6), d(2025, 1, 7), now())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let pool = test_pool().await;
    let err = SlotGenerator::generate(&pool, Uuid::new_v4(), d(2025, 1, 6), d(2025, 1, 7), now())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));
}

#[tokio::test]
async fn overlapping_adhoc_session_blocks_generation() {
    let pool = test_pool().await;
    let trainer = Uuid::new_v4();
    let config = seed_config(&pool, &full_week_config(Uuid::new_v4(), trainer)).await;
    let template = seed_template(&pool, trainer, Recurrence::Once, None).await;

    // Ad-hoc slot straddling the template's window on its start date.
    seed_session(
        &pool,
        config.company_id,
        Uuid::new_v4(),
        trainer,
        d(2025, 1, 1),
        t(10, 30),
        t(11, 30),
        4,
    )
    .await;

    let report = SlotGenerator::generate(&pool, template.id, d(2025, 1, 1), d(2025, 1, 1), now())
        .await
        .unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::Overlap);
}

#[tokio::test]
async fn monthly_template_skips_short_months_in_storage_too() {
    let pool = test_pool().await;
    let trainer = Uuid::new_v4();
    seed_config(&pool, &full_week_config(Uuid::new_v4(), trainer)).await;

    let created = now();
    let template = TrainingSessionTemplate {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        package_id: Uuid::new_v4(),
        trainer_id: trainer,
        start_time: t(10, 0),
        end_time: t(11, 0),
        max_participants: 6,
        recurrence: Recurrence::Monthly,
        weekdays: None,
        start_date: d(2025, 1, 31),
        end_date: d(2025, 12, 31),
        status: TemplateStatus::Active,
        created_at: created,
        updated_at: created,
    };
    let mut conn = pool.acquire().await.unwrap();
    TemplateRepository::insert(&mut conn, &template).await.unwrap();
    drop(conn);

    let report = SlotGenerator::generate(&pool, template.id, d(2025, 1, 1), d(2025, 4, 30), now())
        .await
        .unwrap();
    let mut dates: Vec<_> = report.created.iter().map(|s| s.date).collect();
    dates.sort();
    // No 31st in February or April.
    assert_eq!(dates, vec![d(2025, 1, 31), d(2025, 3, 31)]);
}
