use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DoneRecordRow, PetRow, TaskRow, WeightRecordRow};
use crate::services::schedule::ScheduleError;
use shared::{DoneRecord, Pet, Task, WeightRecord};

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("You can only access your own data")]
    Forbidden,
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolve a pet and verify it belongs to `principal`.
///
/// At every link of the ownership chain, absence is reported before
/// ownership: a missing resource is NotFound for everyone, an existing
/// resource owned by someone else is Forbidden.
pub async fn resolve_pet(
    pool: &SqlitePool,
    pet_id: &Uuid,
    principal: &Uuid,
) -> Result<Pet, AccessError> {
    let row: Option<PetRow> = sqlx::query_as("SELECT * FROM pets WHERE id = ?")
        .bind(pet_id.to_string())
        .fetch_optional(pool)
        .await?;

    let pet = row.ok_or(AccessError::NotFound("Pet"))?.to_shared();
    if pet.user_id != *principal {
        return Err(AccessError::Forbidden);
    }
    Ok(pet)
}

/// Resolve a task and verify it belongs to `principal`. Task creation
/// guarantees the task owner equals the pet owner, so the stored owner
/// covers the whole chain.
pub async fn resolve_task(
    pool: &SqlitePool,
    task_id: &Uuid,
    principal: &Uuid,
) -> Result<Task, AccessError> {
    let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
        .bind(task_id.to_string())
        .fetch_optional(pool)
        .await?;

    let task = row.ok_or(AccessError::NotFound("Task"))?.to_shared()?;
    if task.user_id != *principal {
        return Err(AccessError::Forbidden);
    }
    Ok(task)
}

/// Resolve a done record addressed under `task_id` and verify the chain up
/// to `principal`. A record that exists but hangs off a different task than
/// the one named in the path is NotFound, regardless of who owns either
/// task.
pub async fn resolve_done_record(
    pool: &SqlitePool,
    record_id: &Uuid,
    task_id: &Uuid,
    principal: &Uuid,
) -> Result<(DoneRecord, Task), AccessError> {
    let row: Option<DoneRecordRow> = sqlx::query_as("SELECT * FROM task_done_records WHERE id = ?")
        .bind(record_id.to_string())
        .fetch_optional(pool)
        .await?;

    let record = row.ok_or(AccessError::NotFound("Done record"))?.to_shared();
    if record.task_id != *task_id {
        return Err(AccessError::NotFound("Done record"));
    }

    let task = resolve_task(pool, task_id, principal).await?;
    Ok((record, task))
}

/// Resolve a weight record addressed under `pet_id`; same parent-scope rule
/// as done records.
pub async fn resolve_weight_record(
    pool: &SqlitePool,
    record_id: &Uuid,
    pet_id: &Uuid,
    principal: &Uuid,
) -> Result<(WeightRecord, Pet), AccessError> {
    let row: Option<WeightRecordRow> = sqlx::query_as("SELECT * FROM weight_records WHERE id = ?")
        .bind(record_id.to_string())
        .fetch_optional(pool)
        .await?;

    let record = row.ok_or(AccessError::NotFound("Weight record"))?.to_shared();
    if record.pet_id != *pet_id {
        return Err(AccessError::NotFound("Weight record"));
    }

    let pet = resolve_pet(pool, pet_id, principal).await?;
    Ok((record, pet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_pet, seed_user, test_pool};
    use chrono::Utc;

    async fn seed_task(pool: &SqlitePool, owner_id: &Uuid, pet_id: &Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO tasks (id, title, due_date, user_id, pet_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind("Vet visit")
        .bind(now)
        .bind(owner_id.to_string())
        .bind(pet_id.to_string())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    async fn seed_done_record(pool: &SqlitePool, task_id: &Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO task_done_records (id, date, task_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(now)
        .bind(task_id.to_string())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let err = resolve_task(&pool, &Uuid::new_v4(), &alice)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound("Task")));
    }

    #[tokio::test]
    async fn test_foreign_task_is_forbidden() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;
        let task = seed_task(&pool, &alice, &pet).await;

        assert!(resolve_task(&pool, &task, &alice).await.is_ok());

        let err = resolve_task(&pool, &task, &bob).await.unwrap_err();
        assert!(matches!(err, AccessError::Forbidden));
    }

    #[tokio::test]
    async fn test_done_record_chain_checks() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;
        let task = seed_task(&pool, &alice, &pet).await;
        let other_task = seed_task(&pool, &alice, &pet).await;
        let record = seed_done_record(&pool, &task).await;

        // Owner through the right parent
        let (resolved, _) = resolve_done_record(&pool, &record, &task, &alice)
            .await
            .unwrap();
        assert_eq!(resolved.id, record);

        // Wrong parent task: not found even for the owner
        let err = resolve_done_record(&pool, &record, &other_task, &alice)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound("Done record")));

        // Right parent, wrong principal: forbidden
        let err = resolve_done_record(&pool, &record, &task, &bob)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden));
    }

    #[tokio::test]
    async fn test_weight_record_wrong_parent_is_not_found() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let rex = seed_pet(&pool, &alice, "Rex").await;
        let maple = seed_pet(&pool, &alice, "Maple").await;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO weight_records (id, value, date, pet_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(12.5)
        .bind(now)
        .bind(rex.to_string())
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .unwrap();

        assert!(resolve_weight_record(&pool, &id, &rex, &alice).await.is_ok());

        let err = resolve_weight_record(&pool, &id, &maple, &alice)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound("Weight record")));
    }
}
