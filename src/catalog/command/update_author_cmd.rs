use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::authors::domain::model::AuthorParams;
use crate::authors::dto::AuthorDto;
use crate::catalog::command::validate_author;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;

pub(crate) struct UpdateAuthorCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl UpdateAuthorCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateAuthorCommandRequest {
    pub(crate) id: i64,
    pub(crate) author: AuthorParams,
}

#[cfg(test)]
impl UpdateAuthorCommandRequest {
    pub fn new(id: i64, name: &str, bio: Option<&str>) -> Self {
        Self {
            id,
            author: AuthorParams::new(name, bio),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateAuthorCommandResponse {
    pub author: AuthorDto,
}

impl UpdateAuthorCommandResponse {
    pub fn new(author: AuthorDto) -> Self {
        Self {
            author,
        }
    }
}

#[async_trait]
impl Command<UpdateAuthorCommandRequest, UpdateAuthorCommandResponse> for UpdateAuthorCommand {
    async fn execute(&self, ctx: &RequestContext, req: UpdateAuthorCommandRequest) -> Result<UpdateAuthorCommandResponse, CommandError> {
        validate_author(&req.author)?;
        self.catalog_service.update_author(ctx, req.id, &req.author)
            .await.map_err(CommandError::from).map(UpdateAuthorCommandResponse::new)
    }
}
