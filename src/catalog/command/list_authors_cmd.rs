use std::sync::Arc;
use async_trait::async_trait;
use serde::Deserialize;
use crate::authors::dto::AuthorDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;
use crate::core::controller::PageBody;
use crate::core::library::ListParams;

pub(crate) struct ListAuthorsCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl ListAuthorsCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListAuthorsCommandRequest {
    pub(crate) page: ListParams,
}

pub(crate) type ListAuthorsCommandResponse = PageBody<AuthorDto>;

#[async_trait]
impl Command<ListAuthorsCommandRequest, ListAuthorsCommandResponse> for ListAuthorsCommand {
    async fn execute(&self, ctx: &RequestContext, req: ListAuthorsCommandRequest) -> Result<ListAuthorsCommandResponse, CommandError> {
        self.catalog_service.list_authors(ctx, &req.page)
            .await.map_err(CommandError::from).map(PageBody::from)
    }
}
