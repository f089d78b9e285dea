use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db::models::SessionStatus;
use crate::db::repositories::{
    AvailabilityRepository, EnrollmentRepository, PurchaseRepository, SessionRepository,
};
use crate::scheduling::enrollment::{session_end_utc, session_start_utc};
use crate::scheduling::error::SchedulingResult;

#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub expired_sessions: u64,
    pub started_sessions: u64,
    pub completed_sessions: u64,
    pub no_show_sessions: u64,
    pub expired_purchases: u64,
}

/// One pass of the time-based transitions. Session starts and ends are
/// wall-clock in the trainer's timezone; a day of slack on the date filter
/// covers zone skew in either direction.
pub async fn run_once(pool: &SqlitePool, now: DateTime<Utc>) -> SchedulingResult<SweepReport> {
    let mut report = SweepReport::default();
    let mut tx = pool.begin().await?;

    let horizon = (now + Duration::days(1)).date_naive();
    let due = SessionRepository::list_due_for_sweep(&mut *tx, horizon).await?;

    for session in due {
        let config = AvailabilityRepository::find_config(&mut *tx, session.trainer_id).await?;
        let start = session_start_utc(&session, config.as_ref());
        let end = session_end_utc(&session, config.as_ref());

        match session.status {
            SessionStatus::Scheduled if start <= now => {
                let holding =
                    EnrollmentRepository::count_holding_slots(&mut *tx, session.id).await?;
                if holding == 0 {
                    SessionRepository::set_status(&mut *tx, session.id, SessionStatus::Expired, now)
                        .await?;
                    report.expired_sessions += 1;
                } else {
                    // Enrolled but never confirmed: the session still happens.
                    SessionRepository::set_status(
                        &mut *tx,
                        session.id,
                        SessionStatus::InProgress,
                        now,
                    )
                    .await?;
                    report.started_sessions += 1;
                }
            }
            SessionStatus::Confirmed if end <= now => {
                let checked_in =
                    EnrollmentRepository::count_checked_in(&mut *tx, session.id).await?;
                let next = if checked_in == 0 {
                    report.no_show_sessions += 1;
                    SessionStatus::NoShow
                } else {
                    report.completed_sessions += 1;
                    SessionStatus::Completed
                };
                SessionRepository::set_status(&mut *tx, session.id, next, now).await?;
            }
            SessionStatus::Confirmed if start <= now => {
                SessionRepository::set_status(&mut *tx, session.id, SessionStatus::InProgress, now)
                    .await?;
                report.started_sessions += 1;
            }
            SessionStatus::InProgress if end <= now => {
                SessionRepository::set_status(&mut *tx, session.id, SessionStatus::Completed, now)
                    .await?;
                report.completed_sessions += 1;
            }
            _ => {}
        }
    }

    report.expired_purchases = PurchaseRepository::expire_due(&mut *tx, now).await?;
    tx.commit().await?;
    Ok(report)
}

/// Background sweeper driven by a tokio interval. An external scheduler can
/// call `run_once` directly instead.
pub fn spawn_sweeper(pool: SqlitePool, every: StdDuration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match run_once(&pool, Utc::now()).await {
                Ok(report) => {
                    if report.expired_sessions
                        + report.started_sessions
                        + report.completed_sessions
                        + report.no_show_sessions
                        + report.expired_purchases
                        > 0
                    {
                        info!(?report, "Scheduling sweep applied transitions");
                    }
                }
                Err(err) => error!("Scheduling sweep failed: {err}"),
            }
        }
    })
}
