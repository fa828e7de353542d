use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for task completion records
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DoneRecordRow {
    pub id: String,
    pub date: DateTime<Utc>,
    pub task_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DoneRecordRow {
    pub fn to_shared(&self) -> shared::DoneRecord {
        shared::DoneRecord {
            id: Uuid::parse_str(&self.id).unwrap(),
            date: self.date,
            task_id: Uuid::parse_str(&self.task_id).unwrap(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
