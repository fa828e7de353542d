use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for pets
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PetRow {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birthdate: NaiveDate,
    pub picture_ref: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PetRow {
    pub fn to_shared(&self) -> shared::Pet {
        shared::Pet {
            id: Uuid::parse_str(&self.id).unwrap(),
            name: self.name.clone(),
            species: self.species.clone(),
            breed: self.breed.clone(),
            birthdate: self.birthdate,
            picture_ref: self.picture_ref.clone(),
            user_id: Uuid::parse_str(&self.user_id).unwrap(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
