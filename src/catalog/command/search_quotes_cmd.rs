use std::sync::Arc;
use async_trait::async_trait;
use serde::Deserialize;
use crate::catalog::command::validate_query;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;
use crate::core::controller::PageBody;
use crate::core::library::ListParams;
use crate::quotes::dto::QuoteWithAuthorDto;

pub(crate) struct SearchQuotesCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl SearchQuotesCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuotesCommandRequest {
    pub(crate) query: String,
    pub(crate) page: ListParams,
}

pub(crate) type SearchQuotesCommandResponse = PageBody<QuoteWithAuthorDto>;

#[async_trait]
impl Command<SearchQuotesCommandRequest, SearchQuotesCommandResponse> for SearchQuotesCommand {
    async fn execute(&self, ctx: &RequestContext, req: SearchQuotesCommandRequest) -> Result<SearchQuotesCommandResponse, CommandError> {
        validate_query(req.query.as_str())?;
        self.catalog_service.search_quotes(ctx, req.query.as_str(), &req.page)
            .await.map_err(CommandError::from).map(PageBody::from)
    }
}
