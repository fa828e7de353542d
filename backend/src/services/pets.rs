use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PetRow;
use shared::{CreatePetRequest, Pet, UpdatePetRequest};

#[derive(Debug, Error)]
pub enum PetError {
    #[error("Pet not found")]
    #[allow(dead_code)]
    NotFound,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn create_pet(
    pool: &SqlitePool,
    owner_id: &Uuid,
    request: &CreatePetRequest,
) -> Result<Pet, PetError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO pets (id, name, species, breed, birthdate, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&request.name)
    .bind(&request.species)
    .bind(&request.breed)
    .bind(request.birthdate)
    .bind(owner_id.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Pet {
        id,
        name: request.name.clone(),
        species: request.species.clone(),
        breed: request.breed.clone(),
        birthdate: request.birthdate,
        picture_ref: None,
        user_id: *owner_id,
        created_at: now,
        updated_at: now,
    })
}

pub async fn list_pets(pool: &SqlitePool, owner_id: &Uuid) -> Result<Vec<Pet>, PetError> {
    let rows: Vec<PetRow> =
        sqlx::query_as("SELECT * FROM pets WHERE user_id = ? ORDER BY created_at DESC")
            .bind(owner_id.to_string())
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|row| row.to_shared()).collect())
}

/// Apply a partial update to an already-resolved pet. Ownership is fixed at
/// creation and not updatable.
pub async fn update_pet(
    pool: &SqlitePool,
    pet: &Pet,
    request: &UpdatePetRequest,
) -> Result<Pet, PetError> {
    let mut updated = pet.clone();

    if let Some(ref name) = request.name {
        updated.name = name.clone();
    }
    if let Some(ref species) = request.species {
        updated.species = species.clone();
    }
    if let Some(ref breed) = request.breed {
        updated.breed = breed.clone();
    }
    if let Some(birthdate) = request.birthdate {
        updated.birthdate = birthdate;
    }

    let now = Utc::now();
    updated.updated_at = now;

    sqlx::query(
        r#"
        UPDATE pets SET name = ?, species = ?, breed = ?, birthdate = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&updated.name)
    .bind(&updated.species)
    .bind(&updated.breed)
    .bind(updated.birthdate)
    .bind(now)
    .bind(updated.id.to_string())
    .execute(pool)
    .await?;

    Ok(updated)
}

/// Delete a pet and everything hanging off it: its tasks, those tasks'
/// completion history, and its weight records, in one transaction.
pub async fn delete_pet(pool: &SqlitePool, pet_id: &Uuid) -> Result<(), PetError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM task_done_records WHERE task_id IN (SELECT id FROM tasks WHERE pet_id = ?)",
    )
    .bind(pet_id.to_string())
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM tasks WHERE pet_id = ?")
        .bind(pet_id.to_string())
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM weight_records WHERE pet_id = ?")
        .bind(pet_id.to_string())
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM pets WHERE id = ?")
        .bind(pet_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_user, test_pool};
    use crate::services::access::{self, AccessError};
    use crate::services::tasks;
    use chrono::{NaiveDate, TimeZone};
    use shared::CreateTaskRequest;

    fn pet_request(name: &str) -> CreatePetRequest {
        CreatePetRequest {
            name: name.to_string(),
            species: "cat".to_string(),
            breed: "Maine Coon".to_string(),
            birthdate: NaiveDate::from_ymd_opt(2021, 3, 14).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_pets() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;

        create_pet(&pool, &alice, &pet_request("Maple")).await.unwrap();
        create_pet(&pool, &alice, &pet_request("Rex")).await.unwrap();
        create_pet(&pool, &bob, &pet_request("Otis")).await.unwrap();

        let pets = list_pets(&pool, &alice).await.unwrap();
        assert_eq!(pets.len(), 2);
        assert!(pets.iter().all(|p| p.user_id == alice));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_omitted_fields() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let pet = create_pet(&pool, &alice, &pet_request("Maple")).await.unwrap();

        let updated = update_pet(
            &pool,
            &pet,
            &UpdatePetRequest {
                breed: Some("Norwegian Forest".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Maple");
        assert_eq!(updated.species, "cat");
        assert_eq!(updated.breed, "Norwegian Forest");
        assert_eq!(updated.user_id, alice);
    }

    #[tokio::test]
    async fn test_delete_pet_cascades() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let pet = create_pet(&pool, &alice, &pet_request("Maple")).await.unwrap();

        let task = tasks::create_task(
            &pool,
            &alice,
            &CreateTaskRequest {
                title: "Claw trim".to_string(),
                description: None,
                due_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                interval: None,
                user: alice,
                pet: pet.id,
            },
        )
        .await
        .unwrap();
        tasks::complete_task(&pool, &task, Utc::now(), chrono_tz::UTC)
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO weight_records (id, value, date, pet_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(5.2)
        .bind(Utc::now())
        .bind(pet.id.to_string())
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        delete_pet(&pool, &pet.id).await.unwrap();

        let err = access::resolve_pet(&pool, &pet.id, &alice).await.unwrap_err();
        assert!(matches!(err, AccessError::NotFound("Pet")));

        let tasks_left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE pet_id = ?")
            .bind(pet.id.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        let records_left: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM task_done_records WHERE task_id = ?")
                .bind(task.id.to_string())
                .fetch_one(&pool)
                .await
                .unwrap();
        let weights_left: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM weight_records WHERE pet_id = ?")
                .bind(pet.id.to_string())
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(tasks_left, 0);
        assert_eq!(records_left, 0);
        assert_eq!(weights_left, 0);
    }
}
