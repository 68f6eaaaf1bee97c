use std::sync::Arc;
use async_trait::async_trait;
use serde::Deserialize;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;

pub(crate) struct DeleteAuthorCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl DeleteAuthorCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteAuthorCommandRequest {
    pub(crate) id: i64,
}

#[async_trait]
impl Command<DeleteAuthorCommandRequest, ()> for DeleteAuthorCommand {
    async fn execute(&self, ctx: &RequestContext, req: DeleteAuthorCommandRequest) -> Result<(), CommandError> {
        self.catalog_service.delete_author(ctx, req.id).await.map_err(CommandError::from)
    }
}
