use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::authors::dto::AuthorDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;

pub(crate) struct GetAuthorCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl GetAuthorCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetAuthorCommandRequest {
    pub(crate) id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetAuthorCommandResponse {
    pub author: AuthorDto,
}

impl GetAuthorCommandResponse {
    pub fn new(author: AuthorDto) -> Self {
        Self {
            author,
        }
    }
}

#[async_trait]
impl Command<GetAuthorCommandRequest, GetAuthorCommandResponse> for GetAuthorCommand {
    async fn execute(&self, ctx: &RequestContext, req: GetAuthorCommandRequest) -> Result<GetAuthorCommandResponse, CommandError> {
        self.catalog_service.get_author(ctx, req.id)
            .await.map_err(CommandError::from).map(GetAuthorCommandResponse::new)
    }
}
