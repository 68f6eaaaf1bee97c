pub mod create_author_cmd;
pub mod create_quote_cmd;
pub mod delete_author_cmd;
pub mod delete_quote_cmd;
pub mod get_author_cmd;
pub mod get_quote_cmd;
pub mod get_random_quote_cmd;
pub mod list_authors_cmd;
pub mod list_quotes_cmd;
pub mod search_authors_cmd;
pub mod search_quotes_cmd;
pub mod update_author_cmd;
pub mod update_quote_cmd;

use crate::authors::domain::model::AuthorParams;
use crate::core::command::{check_length, CommandError};
use crate::quotes::domain::model::QuoteParams;

pub(crate) const MAX_NAME_LEN: usize = 255;
pub(crate) const MAX_SOURCE_LEN: usize = 500;

pub(crate) fn validate_author(author: &AuthorParams) -> Result<(), CommandError> {
    check_length("name", author.name.as_str(), 1, MAX_NAME_LEN)
}

pub(crate) fn validate_quote(quote: &QuoteParams) -> Result<(), CommandError> {
    check_length("content", quote.content.as_str(), 1, usize::MAX)?;
    if quote.author_id < 1 {
        return Err(CommandError::validation("valid author_id is required"));
    }
    if let Some(source) = &quote.source {
        check_length("source", source.as_str(), 0, MAX_SOURCE_LEN)?;
    }
    Ok(())
}

pub(crate) fn validate_query(query: &str) -> Result<(), CommandError> {
    if query.trim().is_empty() {
        return Err(CommandError::validation("search query is required"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn memory_service() -> std::sync::Arc<dyn crate::catalog::domain::CatalogService> {
    use crate::core::domain::Configuration;
    use crate::core::repository::{RepositoryStore, StorageBackend};
    use crate::utils::memory::MemoryStore;
    let config = Configuration::new("test", RepositoryStore::Memory);
    crate::catalog::factory::create_catalog_service(&config, &StorageBackend::Memory(MemoryStore::new()))
}
