use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    pub company_id: Uuid,
    pub tutor_id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPet {
    pub company_id: Uuid,
    pub tutor_id: Uuid,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
}
