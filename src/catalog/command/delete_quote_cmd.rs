use std::sync::Arc;
use async_trait::async_trait;
use serde::Deserialize;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;

pub(crate) struct DeleteQuoteCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl DeleteQuoteCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteQuoteCommandRequest {
    pub(crate) id: i64,
}

#[async_trait]
impl Command<DeleteQuoteCommandRequest, ()> for DeleteQuoteCommand {
    async fn execute(&self, ctx: &RequestContext, req: DeleteQuoteCommandRequest) -> Result<(), CommandError> {
        self.catalog_service.delete_quote(ctx, req.id).await.map_err(CommandError::from)
    }
}
