use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::scheduling::SchedulingError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::Sqlx(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
            AppError::Scheduling(err) => match err {
                SchedulingError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
                SchedulingError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
                SchedulingError::SoldOut => (StatusCode::CONFLICT, "Session is fully booked"),
                SchedulingError::NoActivePurchase | SchedulingError::InsufficientSessions => {
                    (StatusCode::CONFLICT, "No remaining package sessions")
                }
                SchedulingError::CancellationWindow { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "Cancellation window closed")
                }
                SchedulingError::AlreadyEnrolled => {
                    (StatusCode::CONFLICT, "Pet is already enrolled")
                }
                SchedulingError::Database(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            AppError::InternalServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
