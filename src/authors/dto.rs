use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::authors::domain::model::AuthorEntity;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// AuthorDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl Identifiable for AuthorDto {
    fn id(&self) -> i64 {
        self.id
    }
}

impl From<AuthorEntity> for AuthorDto {
    fn from(other: AuthorEntity) -> Self {
        Self {
            id: other.id,
            name: other.name,
            bio: other.bio,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crate::authors::domain::model::AuthorEntity;
    use crate::authors::dto::AuthorDto;

    #[tokio::test]
    async fn test_should_omit_missing_bio() {
        let now = Utc::now().naive_utc();
        let author = AuthorDto::from(AuthorEntity {
            id: 7,
            name: "Marcus Aurelius".to_string(),
            bio: None,
            created_at: now,
            updated_at: now,
        });
        let val = serde_json::to_value(&author).expect("should serialize");
        assert_eq!(7, val["id"]);
        assert_eq!("Marcus Aurelius", val["name"]);
        assert!(val.get("bio").is_none());
        assert!(val["created_at"].is_string());
    }
}
