use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use sqlx::types::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{NewPet, Pet};
use crate::db::repositories::PetRepository;
use crate::error::{AppError, AppResult};

pub async fn create_pet(
    State(state): State<AppState>,
    Json(payload): Json<NewPet>,
) -> AppResult<Json<Pet>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let now = Utc::now();
    let pet = Pet {
        id: Uuid::new_v4(),
        company_id: payload.company_id,
        tutor_id: payload.tutor_id,
        name: payload.name,
        breed: payload.breed,
        birth_date: payload.birth_date,
        created_at: now,
        updated_at: now,
    };
    let mut conn = state.db.acquire().await?;
    let pet = PetRepository::insert(&mut conn, &pet).await?;
    Ok(Json(pet))
}

pub async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Pet>> {
    let mut conn = state.db.acquire().await?;
    let pet = PetRepository::find(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pet".into()))?;
    Ok(Json(pet))
}

pub async fn list_pets_for_tutor(
    State(state): State<AppState>,
    Path(tutor_id): Path<Uuid>,
) -> AppResult<Json<Vec<Pet>>> {
    let mut conn = state.db.acquire().await?;
    let pets = PetRepository::list_for_tutor(&mut conn, tutor_id).await?;
    Ok(Json(pets))
}
