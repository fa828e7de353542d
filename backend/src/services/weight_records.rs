use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::WeightRecordRow;
use shared::{CreateWeightRecordRequest, UpdateWeightRecordRequest, WeightRecord};

#[derive(Debug, Error)]
pub enum WeightRecordError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn create_record(
    pool: &SqlitePool,
    pet_id: &Uuid,
    request: &CreateWeightRecordRequest,
) -> Result<WeightRecord, WeightRecordError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO weight_records (id, value, date, pet_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(request.value)
    .bind(request.date)
    .bind(pet_id.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(WeightRecord {
        id,
        value: request.value,
        date: request.date,
        pet_id: *pet_id,
        created_at: now,
        updated_at: now,
    })
}

/// Weight history for a pet, newest measurement first.
pub async fn list_for_pet(
    pool: &SqlitePool,
    pet_id: &Uuid,
) -> Result<Vec<WeightRecord>, WeightRecordError> {
    let rows: Vec<WeightRecordRow> =
        sqlx::query_as("SELECT * FROM weight_records WHERE pet_id = ? ORDER BY date DESC")
            .bind(pet_id.to_string())
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|row| row.to_shared()).collect())
}

pub async fn update_record(
    pool: &SqlitePool,
    record: &WeightRecord,
    request: &UpdateWeightRecordRequest,
) -> Result<WeightRecord, WeightRecordError> {
    let mut updated = record.clone();

    if let Some(value) = request.value {
        updated.value = value;
    }
    if let Some(date) = request.date {
        updated.date = date;
    }

    let now = Utc::now();
    updated.updated_at = now;

    sqlx::query("UPDATE weight_records SET value = ?, date = ?, updated_at = ? WHERE id = ?")
        .bind(updated.value)
        .bind(updated.date)
        .bind(now)
        .bind(updated.id.to_string())
        .execute(pool)
        .await?;

    Ok(updated)
}

pub async fn delete_record(
    pool: &SqlitePool,
    record_id: &Uuid,
) -> Result<(), WeightRecordError> {
    sqlx::query("DELETE FROM weight_records WHERE id = ?")
        .bind(record_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}
