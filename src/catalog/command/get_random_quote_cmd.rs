use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;
use crate::quotes::dto::QuoteWithAuthorDto;

pub(crate) struct GetRandomQuoteCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl GetRandomQuoteCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetRandomQuoteCommandResponse {
    pub quote: QuoteWithAuthorDto,
}

impl GetRandomQuoteCommandResponse {
    pub fn new(quote: QuoteWithAuthorDto) -> Self {
        Self {
            quote,
        }
    }
}

#[async_trait]
impl Command<(), GetRandomQuoteCommandResponse> for GetRandomQuoteCommand {
    async fn execute(&self, ctx: &RequestContext, _req: ()) -> Result<GetRandomQuoteCommandResponse, CommandError> {
        self.catalog_service.get_random_quote(ctx)
            .await.map_err(CommandError::from).map(GetRandomQuoteCommandResponse::new)
    }
}
