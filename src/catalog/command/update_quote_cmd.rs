use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::command::validate_quote;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;
use crate::quotes::domain::model::QuoteParams;
use crate::quotes::dto::QuoteDto;

pub(crate) struct UpdateQuoteCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl UpdateQuoteCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateQuoteCommandRequest {
    pub(crate) id: i64,
    pub(crate) quote: QuoteParams,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateQuoteCommandResponse {
    pub quote: QuoteDto,
}

impl UpdateQuoteCommandResponse {
    pub fn new(quote: QuoteDto) -> Self {
        Self {
            quote,
        }
    }
}

#[async_trait]
impl Command<UpdateQuoteCommandRequest, UpdateQuoteCommandResponse> for UpdateQuoteCommand {
    async fn execute(&self, ctx: &RequestContext, req: UpdateQuoteCommandRequest) -> Result<UpdateQuoteCommandResponse, CommandError> {
        validate_quote(&req.quote)?;
        self.catalog_service.update_quote(ctx, req.id, &req.quote)
            .await.map_err(CommandError::from).map(UpdateQuoteCommandResponse::new)
    }
}
