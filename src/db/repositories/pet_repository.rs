use sqlx::types::Uuid;
use sqlx::SqliteConnection;

use crate::db::models::Pet;

pub struct PetRepository;

impl PetRepository {
    pub async fn insert(conn: &mut SqliteConnection, pet: &Pet) -> Result<Pet, sqlx::Error> {
        sqlx::query_as::<_, Pet>(
            r#"
            INSERT INTO pets (
                id, company_id, tutor_id, name, breed, birth_date,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(pet.id)
        .bind(pet.company_id)
        .bind(pet.tutor_id)
        .bind(&pet.name)
        .bind(&pet.breed)
        .bind(pet.birth_date)
        .bind(pet.created_at)
        .bind(pet.updated_at)
        .fetch_one(conn)
        .await
    }

    pub async fn find(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Pet>, sqlx::Error> {
        sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list_for_tutor(
        conn: &mut SqliteConnection,
        tutor_id: Uuid,
    ) -> Result<Vec<Pet>, sqlx::Error> {
        sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE tutor_id = ? ORDER BY name")
            .bind(tutor_id)
            .fetch_all(conn)
            .await
    }
}
