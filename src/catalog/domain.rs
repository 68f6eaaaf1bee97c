pub mod service;

use async_trait::async_trait;
use crate::authors::domain::model::AuthorParams;
use crate::authors::dto::AuthorDto;
use crate::core::context::RequestContext;
use crate::core::library::{CatalogResult, ListParams, PaginatedResult};
use crate::quotes::domain::model::QuoteParams;
use crate::quotes::dto::{QuoteDto, QuoteWithAuthorDto};

#[async_trait]
pub trait CatalogService: Sync + Send {
    async fn create_author(&self, ctx: &RequestContext, params: &AuthorParams) -> CatalogResult<AuthorDto>;
    async fn get_author(&self, ctx: &RequestContext, id: i64) -> CatalogResult<AuthorDto>;
    async fn list_authors(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<PaginatedResult<AuthorDto>>;
    async fn update_author(&self, ctx: &RequestContext, id: i64, params: &AuthorParams) -> CatalogResult<AuthorDto>;
    async fn delete_author(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()>;
    async fn search_authors(&self, ctx: &RequestContext, query: &str,
                            params: &ListParams) -> CatalogResult<PaginatedResult<AuthorDto>>;

    async fn create_quote(&self, ctx: &RequestContext, params: &QuoteParams) -> CatalogResult<QuoteDto>;
    async fn get_quote(&self, ctx: &RequestContext, id: i64) -> CatalogResult<QuoteWithAuthorDto>;
    async fn list_quotes(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<PaginatedResult<QuoteWithAuthorDto>>;
    async fn list_quotes_by_author(&self, ctx: &RequestContext, author_id: i64,
                                   params: &ListParams) -> CatalogResult<PaginatedResult<QuoteWithAuthorDto>>;
    async fn update_quote(&self, ctx: &RequestContext, id: i64, params: &QuoteParams) -> CatalogResult<QuoteDto>;
    async fn delete_quote(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()>;
    async fn search_quotes(&self, ctx: &RequestContext, query: &str,
                           params: &ListParams) -> CatalogResult<PaginatedResult<QuoteWithAuthorDto>>;
    async fn get_random_quote(&self, ctx: &RequestContext) -> CatalogResult<QuoteWithAuthorDto>;
}
