use sqlx::SqlitePool;

use crate::config;
use crate::notify::Notifier;
use crate::scheduling::SchedulingPolicy;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub env: config::Config,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(db: SqlitePool, env: config::Config, notifier: Notifier) -> Self {
        Self { db, env, notifier }
    }

    pub fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy {
            cancellation_cutoff_hours: self.env.scheduling.cancellation_cutoff_hours,
            ..SchedulingPolicy::default()
        }
    }
}
