use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// QuoteEntity is the stored quote row. author_id must reference an existing
// author at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuoteEntity {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    pub source: Option<String>,
    // display order only
    pub tags: Vec<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

// QuoteWithAuthorEntity is the read-side join of a quote with its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuoteWithAuthorEntity {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quote: QuoteEntity,
    pub author_name: String,
    pub author_bio: Option<String>,
}

// QuoteParams carries the writable quote fields for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteParams {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_id: i64,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

// null_as_empty reads an explicit `null` list as empty.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl QuoteParams {
    pub fn new(content: &str, author_id: i64) -> Self {
        Self {
            content: content.to_string(),
            author_id,
            source: None,
            tags: vec![],
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

impl Identifiable for QuoteEntity {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identifiable for QuoteWithAuthorEntity {
    fn id(&self) -> i64 {
        self.quote.id
    }
}
