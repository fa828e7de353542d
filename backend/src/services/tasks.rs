use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{PetRow, TaskRow};
use crate::services::schedule::{self, ScheduleError};
use shared::{CreateTaskRequest, DoneRecord, Task, UpdateTaskRequest};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Pet not found")]
    PetNotFound,
    #[error("You can only manage tasks for your own pets")]
    Forbidden,
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a task for one of the principal's pets. The pet reference is
/// checked against the pet row itself, not the client-supplied owner, so a
/// task can never point at a pet owned by someone else.
pub async fn create_task(
    pool: &SqlitePool,
    principal: &Uuid,
    request: &CreateTaskRequest,
) -> Result<Task, TaskError> {
    if request.user != *principal {
        return Err(TaskError::Forbidden);
    }

    let pet: Option<PetRow> = sqlx::query_as("SELECT * FROM pets WHERE id = ?")
        .bind(request.pet.to_string())
        .fetch_optional(pool)
        .await?;
    let pet = pet.ok_or(TaskError::PetNotFound)?;

    if pet.user_id != principal.to_string() {
        return Err(TaskError::Forbidden);
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO tasks (id, title, description, due_date, interval_unit, interval_value, user_id, pet_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&request.title)
    .bind(&request.description)
    .bind(request.due_date)
    .bind(request.interval.map(|i| i.unit.as_str()))
    .bind(request.interval.map(|i| i64::from(i.value)))
    .bind(request.user.to_string())
    .bind(request.pet.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Task {
        id,
        title: request.title.clone(),
        description: request.description.clone(),
        due_date: request.due_date,
        interval: request.interval,
        user_id: request.user,
        pet_id: request.pet,
        created_at: now,
        updated_at: now,
    })
}

pub async fn list_for_pet(pool: &SqlitePool, pet_id: &Uuid) -> Result<Vec<Task>, TaskError> {
    let rows: Vec<TaskRow> =
        sqlx::query_as("SELECT * FROM tasks WHERE pet_id = ? ORDER BY due_date ASC")
            .bind(pet_id.to_string())
            .fetch_all(pool)
            .await?;

    let tasks = rows
        .into_iter()
        .map(|row| row.to_shared())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

/// Apply a partial update to an already-resolved task. An omitted interval
/// field keeps the stored interval; an explicit null clears it.
pub async fn update_task(
    pool: &SqlitePool,
    task: &Task,
    request: &UpdateTaskRequest,
) -> Result<Task, TaskError> {
    let mut updated = task.clone();

    if let Some(ref title) = request.title {
        updated.title = title.clone();
    }
    if let Some(ref description) = request.description {
        updated.description = Some(description.clone());
    }
    if let Some(due_date) = request.due_date {
        updated.due_date = due_date;
    }
    if let Some(interval) = request.interval {
        updated.interval = interval;
    }

    let now = Utc::now();
    updated.updated_at = now;

    sqlx::query(
        r#"
        UPDATE tasks SET title = ?, description = ?, due_date = ?, interval_unit = ?, interval_value = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&updated.title)
    .bind(&updated.description)
    .bind(updated.due_date)
    .bind(updated.interval.map(|i| i.unit.as_str()))
    .bind(updated.interval.map(|i| i64::from(i.value)))
    .bind(now)
    .bind(updated.id.to_string())
    .execute(pool)
    .await?;

    Ok(updated)
}

/// Delete a task together with its completion history. Both deletes run in
/// one transaction; a failure leaves the task and its ledger untouched.
pub async fn delete_task(pool: &SqlitePool, task_id: &Uuid) -> Result<(), TaskError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM task_done_records WHERE task_id = ?")
        .bind(task_id.to_string())
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// Record a completion and advance the task's due date in one transaction.
///
/// The new ledger entry and the recomputed due date commit together or not
/// at all. A task without an interval keeps its due date; only the record
/// is appended. Concurrent completions are not serialized: both ledger
/// entries persist and the last committed due date wins.
pub async fn complete_task(
    pool: &SqlitePool,
    task: &Task,
    date: DateTime<Utc>,
    tz: Tz,
) -> Result<DoneRecord, TaskError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO task_done_records (id, date, task_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(date)
    .bind(task.id.to_string())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if let Some(interval) = task.interval {
        let next_due = schedule::advance(date, interval.unit, interval.value, tz)?;
        sqlx::query("UPDATE tasks SET due_date = ?, updated_at = ? WHERE id = ?")
            .bind(next_due)
            .bind(now)
            .bind(task.id.to_string())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(DoneRecord {
        id,
        date,
        task_id: task.id,
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_pet, seed_user, test_pool};
    use crate::services::access::{self, AccessError};
    use chrono::TimeZone;
    use chrono_tz::UTC;
    use shared::{Interval, IntervalUnit};

    fn request(user: Uuid, pet: Uuid, interval: Option<Interval>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: "Flea treatment".to_string(),
            description: Some("Spot-on, between the shoulders".to_string()),
            due_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            interval,
            user,
            pet,
        }
    }

    async fn done_record_count(pool: &SqlitePool, task_id: &Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM task_done_records WHERE task_id = ?")
            .bind(task_id.to_string())
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_requires_matching_principal() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;

        let err = create_task(&pool, &bob, &request(alice, pet, None))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Forbidden));
    }

    #[tokio::test]
    async fn test_create_cross_checks_pet_owner() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let bobs_pet = seed_pet(&pool, &bob, "Maple").await;

        // Alice names herself as owner but points at Bob's pet
        let err = create_task(&pool, &alice, &request(alice, bobs_pet, None))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Forbidden));

        let err = create_task(&pool, &alice, &request(alice, Uuid::new_v4(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::PetNotFound));
    }

    #[tokio::test]
    async fn test_complete_appends_record_and_advances_due_date() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;
        let interval = Interval {
            unit: IntervalUnit::Weeks,
            value: 2,
        };
        let task = create_task(&pool, &alice, &request(alice, pet, Some(interval)))
            .await
            .unwrap();

        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let record = complete_task(&pool, &task, first, UTC).await.unwrap();
        assert_eq!(record.date, first);

        let task = access::resolve_task(&pool, &task.id, &alice).await.unwrap();
        assert_eq!(
            task.due_date,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(done_record_count(&pool, &task.id).await, 1);

        let second = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        complete_task(&pool, &task, second, UTC).await.unwrap();

        let task = access::resolve_task(&pool, &task.id, &alice).await.unwrap();
        assert_eq!(
            task.due_date,
            Utc.with_ymd_and_hms(2024, 1, 29, 0, 0, 0).unwrap()
        );
        assert_eq!(done_record_count(&pool, &task.id).await, 2);
    }

    #[tokio::test]
    async fn test_complete_without_interval_keeps_due_date() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;
        let task = create_task(&pool, &alice, &request(alice, pet, None))
            .await
            .unwrap();

        complete_task(&pool, &task, Utc::now(), UTC).await.unwrap();

        let after = access::resolve_task(&pool, &task.id, &alice).await.unwrap();
        assert_eq!(after.due_date, task.due_date);
        assert_eq!(done_record_count(&pool, &task.id).await, 1);
    }

    #[tokio::test]
    async fn test_failed_completion_leaves_no_partial_state() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;
        // u32::MAX years overflows the calendar, so the due-date update
        // fails after the ledger insert has already executed.
        let interval = Interval {
            unit: IntervalUnit::Years,
            value: u32::MAX,
        };
        let task = create_task(&pool, &alice, &request(alice, pet, Some(interval)))
            .await
            .unwrap();

        let err = complete_task(&pool, &task, Utc::now(), UTC)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Schedule(_)));

        // The aborted transaction rolled the insert back
        assert_eq!(done_record_count(&pool, &task.id).await, 0);
        let after = access::resolve_task(&pool, &task.id, &alice).await.unwrap();
        assert_eq!(after.due_date, task.due_date);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_done_records() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;
        let task = create_task(&pool, &alice, &request(alice, pet, None))
            .await
            .unwrap();

        for _ in 0..3 {
            complete_task(&pool, &task, Utc::now(), UTC).await.unwrap();
        }
        assert_eq!(done_record_count(&pool, &task.id).await, 3);

        delete_task(&pool, &task.id).await.unwrap();

        assert_eq!(done_record_count(&pool, &task.id).await, 0);
        let err = access::resolve_task(&pool, &task.id, &alice)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound("Task")));
    }

    #[tokio::test]
    async fn test_partial_update_semantics() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;
        let interval = Interval {
            unit: IntervalUnit::Days,
            value: 3,
        };
        let task = create_task(&pool, &alice, &request(alice, pet, Some(interval)))
            .await
            .unwrap();

        // Omitted fields stay untouched
        let updated = update_task(
            &pool,
            &task,
            &UpdateTaskRequest {
                title: Some("Worming".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "Worming");
        assert_eq!(
            updated.description.as_deref(),
            Some("Spot-on, between the shoulders")
        );
        assert_eq!(updated.interval, Some(interval));

        // An explicit null clears the interval
        let updated = update_task(
            &pool,
            &updated,
            &UpdateTaskRequest {
                interval: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(updated.interval.is_none());

        let stored = access::resolve_task(&pool, &task.id, &alice).await.unwrap();
        assert!(stored.interval.is_none());
        assert_eq!(stored.title, "Worming");
        assert_eq!(
            stored.description.as_deref(),
            Some("Spot-on, between the shoulders")
        );
    }

    #[tokio::test]
    async fn test_signup_to_second_completion() {
        let pool = test_pool().await;

        let (user, _) = crate::services::auth::register_user(
            &pool,
            &shared::CreateUserRequest {
                name: "Ada Lovelace".to_string(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "Sup3r-secret".to_string(),
            },
        )
        .await
        .unwrap();

        let pet = crate::services::pets::create_pet(
            &pool,
            &user.id,
            &shared::CreatePetRequest {
                name: "Rex".to_string(),
                species: "dog".to_string(),
                breed: "Labrador".to_string(),
                birthdate: chrono::NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            },
        )
        .await
        .unwrap();

        let task = create_task(
            &pool,
            &user.id,
            &CreateTaskRequest {
                title: "Flea treatment".to_string(),
                description: None,
                due_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                interval: Some(Interval {
                    unit: IntervalUnit::Weeks,
                    value: 2,
                }),
                user: user.id,
                pet: pet.id,
            },
        )
        .await
        .unwrap();

        complete_task(
            &pool,
            &task,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            UTC,
        )
        .await
        .unwrap();
        let task = access::resolve_task(&pool, &task.id, &user.id).await.unwrap();
        assert_eq!(
            task.due_date,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );

        complete_task(
            &pool,
            &task,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            UTC,
        )
        .await
        .unwrap();
        let task = access::resolve_task(&pool, &task.id, &user.id).await.unwrap();
        assert_eq!(
            task.due_date,
            Utc.with_ymd_and_hms(2024, 1, 29, 0, 0, 0).unwrap()
        );

        let records = crate::services::done_records::list_for_task(&pool, &task.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].date > records[1].date);
    }

    #[tokio::test]
    async fn test_list_for_pet_ordered_by_due_date() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let pet = seed_pet(&pool, &alice, "Rex").await;

        let mut late = request(alice, pet, None);
        late.title = "Annual vaccination".to_string();
        late.due_date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        create_task(&pool, &alice, &late).await.unwrap();

        let mut early = request(alice, pet, None);
        early.title = "Flea treatment".to_string();
        early.due_date = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        create_task(&pool, &alice, &early).await.unwrap();

        let tasks = list_for_pet(&pool, &pet).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Flea treatment");
        assert_eq!(tasks[1].title, "Annual vaccination");
    }
}
