use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::schedule::ScheduleError;

/// Database model for tasks. `interval_unit` and `interval_value` are both
/// set or both NULL.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub interval_unit: Option<String>,
    pub interval_value: Option<i64>,
    pub user_id: String,
    pub pet_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    /// A stored unit outside the enumerated set means the row was written
    /// past validation; surface it instead of guessing a default.
    pub fn to_shared(&self) -> Result<shared::Task, ScheduleError> {
        let interval = match (self.interval_unit.as_deref(), self.interval_value) {
            (Some(unit), Some(value)) => Some(shared::Interval {
                unit: unit
                    .parse()
                    .map_err(|_| ScheduleError::UnsupportedUnit(unit.to_string()))?,
                value: value as u32,
            }),
            _ => None,
        };

        Ok(shared::Task {
            id: Uuid::parse_str(&self.id).unwrap(),
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            interval,
            user_id: Uuid::parse_str(&self.user_id).unwrap(),
            pet_id: Uuid::parse_str(&self.pet_id).unwrap(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
