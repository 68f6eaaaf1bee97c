use std::sync::Arc;
use async_trait::async_trait;
use serde::Deserialize;
use crate::authors::dto::AuthorDto;
use crate::catalog::command::validate_query;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;
use crate::core::controller::PageBody;
use crate::core::library::ListParams;

pub(crate) struct SearchAuthorsCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl SearchAuthorsCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchAuthorsCommandRequest {
    pub(crate) query: String,
    pub(crate) page: ListParams,
}

pub(crate) type SearchAuthorsCommandResponse = PageBody<AuthorDto>;

#[async_trait]
impl Command<SearchAuthorsCommandRequest, SearchAuthorsCommandResponse> for SearchAuthorsCommand {
    async fn execute(&self, ctx: &RequestContext, req: SearchAuthorsCommandRequest) -> Result<SearchAuthorsCommandResponse, CommandError> {
        validate_query(req.query.as_str())?;
        self.catalog_service.search_authors(ctx, req.query.as_str(), &req.page)
            .await.map_err(CommandError::from).map(PageBody::from)
    }
}
