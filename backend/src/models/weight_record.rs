use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for pet weight records
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WeightRecordRow {
    pub id: String,
    pub value: f64,
    pub date: DateTime<Utc>,
    pub pet_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeightRecordRow {
    pub fn to_shared(&self) -> shared::WeightRecord {
        shared::WeightRecord {
            id: Uuid::parse_str(&self.id).unwrap(),
            value: self.value,
            date: self.date,
            pet_id: Uuid::parse_str(&self.pet_id).unwrap(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_record_row_to_shared() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let pet_id = Uuid::new_v4();

        let row = WeightRecordRow {
            id: id.to_string(),
            value: 12.4,
            date: now,
            pet_id: pet_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        let shared = row.to_shared();

        assert_eq!(shared.id, id);
        assert_eq!(shared.pet_id, pet_id);
        assert_eq!(shared.value, 12.4);
        assert_eq!(shared.date, now);
    }
}
