use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;
use crate::quotes::dto::QuoteWithAuthorDto;

pub(crate) struct GetQuoteCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl GetQuoteCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetQuoteCommandRequest {
    pub(crate) id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetQuoteCommandResponse {
    pub quote: QuoteWithAuthorDto,
}

impl GetQuoteCommandResponse {
    pub fn new(quote: QuoteWithAuthorDto) -> Self {
        Self {
            quote,
        }
    }
}

#[async_trait]
impl Command<GetQuoteCommandRequest, GetQuoteCommandResponse> for GetQuoteCommand {
    async fn execute(&self, ctx: &RequestContext, req: GetQuoteCommandRequest) -> Result<GetQuoteCommandResponse, CommandError> {
        self.catalog_service.get_quote(ctx, req.id)
            .await.map_err(CommandError::from).map(GetQuoteCommandResponse::new)
    }
}
