use chrono::{DateTime, Utc};
use sqlx::types::Uuid;
use sqlx::SqliteConnection;

use crate::db::repositories::SessionRepository;
use crate::scheduling::error::{SchedulingError, SchedulingResult};

/// Owner of `available_slots`. The persisted counter is the single source of
/// truth; both operations are single guarded statements, so concurrent
/// enrollments on one session can never overbook it.
pub struct SessionCapacityLedger;

impl SessionCapacityLedger {
    /// Take one slot. Callers must have verified the session exists in the
    /// same transaction; a zero-row update therefore means sold out.
    pub async fn reserve(
        conn: &mut SqliteConnection,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> SchedulingResult<()> {
        if SessionRepository::reserve_slot(conn, session_id, now).await? {
            Ok(())
        } else {
            Err(SchedulingError::SoldOut)
        }
    }

    /// Give one slot back. Capped at `max_participants`, so releasing twice
    /// for the same enrollment cannot inflate capacity.
    pub async fn release(
        conn: &mut SqliteConnection,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> SchedulingResult<()> {
        SessionRepository::release_slot(conn, session_id, now).await?;
        Ok(())
    }
}
