use thiserror::Error;

/// Domain failures of the scheduling core. Every precondition failure is
/// surfaced as a typed variant; the HTTP layer maps them to responses.
#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session is fully booked")]
    SoldOut,

    #[error("No active package purchase with remaining sessions")]
    NoActivePurchase,

    #[error("Package purchase has no remaining sessions")]
    InsufficientSessions,

    #[error("Cancellation window closed: sessions can only be cancelled more than {hours} hours before start")]
    CancellationWindow { hours: i64 },

    #[error("Pet is already enrolled in this session")]
    AlreadyEnrolled,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// Unique-constraint detection, used to turn an insert race on the
/// one-enrollment-per-pet index into `AlreadyEnrolled`.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.is_unique_violation()
    )
}
