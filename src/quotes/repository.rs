pub mod memory_quote_repository;
pub mod pg_quote_repository;

use async_trait::async_trait;
use crate::core::context::RequestContext;
use crate::core::library::{CatalogResult, ListParams};
use crate::core::repository::Repository;
use crate::quotes::domain::model::{QuoteEntity, QuoteParams, QuoteWithAuthorEntity};

#[async_trait]
pub trait QuoteRepository: Repository<QuoteEntity, QuoteWithAuthorEntity, QuoteParams> {
    async fn list_by_author(&self, ctx: &RequestContext, author_id: i64,
                            params: &ListParams) -> CatalogResult<Vec<QuoteWithAuthorEntity>>;

    async fn count_by_author(&self, ctx: &RequestContext, author_id: i64) -> CatalogResult<i64>;

    // get_random fails with NotFound when there are no quotes
    async fn get_random(&self, ctx: &RequestContext) -> CatalogResult<QuoteWithAuthorEntity>;
}
