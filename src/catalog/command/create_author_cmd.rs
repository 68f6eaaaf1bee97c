use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::authors::domain::model::AuthorParams;
use crate::authors::dto::AuthorDto;
use crate::catalog::command::validate_author;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;

pub(crate) struct CreateAuthorCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl CreateAuthorCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateAuthorCommandRequest {
    pub(crate) author: AuthorParams,
}

#[cfg(test)]
impl CreateAuthorCommandRequest {
    pub fn new(name: &str, bio: Option<&str>) -> Self {
        Self {
            author: AuthorParams::new(name, bio),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateAuthorCommandResponse {
    pub author: AuthorDto,
}

impl CreateAuthorCommandResponse {
    pub fn new(author: AuthorDto) -> Self {
        Self {
            author,
        }
    }
}

#[async_trait]
impl Command<CreateAuthorCommandRequest, CreateAuthorCommandResponse> for CreateAuthorCommand {
    async fn execute(&self, ctx: &RequestContext, req: CreateAuthorCommandRequest) -> Result<CreateAuthorCommandResponse, CommandError> {
        validate_author(&req.author)?;
        self.catalog_service.create_author(ctx, &req.author)
            .await.map_err(CommandError::from).map(CreateAuthorCommandResponse::new)
    }
}
