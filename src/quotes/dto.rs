use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::quotes::domain::model::{QuoteEntity, QuoteWithAuthorEntity};
use crate::utils::date::serializer;

// QuoteDto is returned by quote writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDto {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

// QuoteWithAuthorDto is returned by every quote read so callers
// get the author name without a second request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteWithAuthorDto {
    #[serde(flatten)]
    pub quote: QuoteDto,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_bio: Option<String>,
}

impl Identifiable for QuoteDto {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identifiable for QuoteWithAuthorDto {
    fn id(&self) -> i64 {
        self.quote.id
    }
}

impl From<QuoteEntity> for QuoteDto {
    fn from(other: QuoteEntity) -> Self {
        Self {
            id: other.id,
            content: other.content,
            author_id: other.author_id,
            source: other.source,
            tags: other.tags,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<QuoteWithAuthorEntity> for QuoteWithAuthorDto {
    fn from(other: QuoteWithAuthorEntity) -> Self {
        Self {
            quote: QuoteDto::from(other.quote),
            author_name: other.author_name,
            author_bio: other.author_bio,
        }
    }
}
