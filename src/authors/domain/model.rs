use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// AuthorEntity is the stored author row; timestamps are assigned by storage on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthorEntity {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

// AuthorParams carries the writable author fields for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
}

impl AuthorParams {
    pub fn new(name: &str, bio: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            bio: bio.map(str::to_string),
        }
    }
}

impl Identifiable for AuthorEntity {
    fn id(&self) -> i64 {
        self.id
    }
}
