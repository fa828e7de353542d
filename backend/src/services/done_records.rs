use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DoneRecordRow, TaskRow};
use shared::{CreateDoneRecordRequest, DoneRecord, UpdateDoneRecordRequest};

#[derive(Debug, Error)]
pub enum DoneRecordError {
    #[error("Task not found")]
    TaskNotFound,
    #[error("You can only record completions for your own tasks")]
    Forbidden,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Completion history for a task, newest first. `date` is the ordering key;
/// insertion order carries no meaning.
pub async fn list_for_task(
    pool: &SqlitePool,
    task_id: &Uuid,
) -> Result<Vec<DoneRecord>, DoneRecordError> {
    let rows: Vec<DoneRecordRow> =
        sqlx::query_as("SELECT * FROM task_done_records WHERE task_id = ? ORDER BY date DESC")
            .bind(task_id.to_string())
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|row| row.to_shared()).collect())
}

/// Insert a bare completion record for an owned task, leaving the task's
/// due date alone. This is the backfill path; a completion that should
/// reschedule the task goes through `tasks::complete_task` instead.
pub async fn create_record(
    pool: &SqlitePool,
    principal: &Uuid,
    request: &CreateDoneRecordRequest,
) -> Result<DoneRecord, DoneRecordError> {
    let task: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
        .bind(request.task.to_string())
        .fetch_optional(pool)
        .await?;
    let task = task.ok_or(DoneRecordError::TaskNotFound)?;

    if task.user_id != principal.to_string() {
        return Err(DoneRecordError::Forbidden);
    }

    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO task_done_records (id, date, task_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(request.date)
    .bind(request.task.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(DoneRecord {
        id,
        date: request.date,
        task_id: request.task,
        created_at: now,
        updated_at: now,
    })
}

/// Correct an existing record's date. History edits never recompute the
/// owning task's due date; only a new completion does.
pub async fn update_record(
    pool: &SqlitePool,
    record: &DoneRecord,
    request: &UpdateDoneRecordRequest,
) -> Result<DoneRecord, DoneRecordError> {
    let mut updated = record.clone();

    if let Some(date) = request.date {
        updated.date = date;
    }

    let now = chrono::Utc::now();
    updated.updated_at = now;

    sqlx::query("UPDATE task_done_records SET date = ?, updated_at = ? WHERE id = ?")
        .bind(updated.date)
        .bind(now)
        .bind(updated.id.to_string())
        .execute(pool)
        .await?;

    Ok(updated)
}

pub async fn delete_record(pool: &SqlitePool, record_id: &Uuid) -> Result<(), DoneRecordError> {
    sqlx::query("DELETE FROM task_done_records WHERE id = ?")
        .bind(record_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}
