use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::command::validate_quote;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;
use crate::quotes::domain::model::QuoteParams;
use crate::quotes::dto::QuoteDto;

pub(crate) struct CreateQuoteCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl CreateQuoteCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateQuoteCommandRequest {
    pub(crate) quote: QuoteParams,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateQuoteCommandResponse {
    pub quote: QuoteDto,
}

impl CreateQuoteCommandResponse {
    pub fn new(quote: QuoteDto) -> Self {
        Self {
            quote,
        }
    }
}

#[async_trait]
impl Command<CreateQuoteCommandRequest, CreateQuoteCommandResponse> for CreateQuoteCommand {
    async fn execute(&self, ctx: &RequestContext, req: CreateQuoteCommandRequest) -> Result<CreateQuoteCommandResponse, CommandError> {
        validate_quote(&req.quote)?;
        self.catalog_service.create_quote(ctx, &req.quote)
            .await.map_err(CommandError::from).map(CreateQuoteCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::catalog::command::create_author_cmd::{CreateAuthorCommand, CreateAuthorCommandRequest};
    use crate::catalog::command::create_quote_cmd::{CreateQuoteCommand, CreateQuoteCommandRequest};
    use crate::catalog::command::memory_service;
    use crate::catalog::domain::CatalogService;
    use crate::core::command::{Command, CommandError};
    use crate::core::context::RequestContext;
    use crate::quotes::domain::model::QuoteParams;

    lazy_static! {
        static ref SUT_SVC: AsyncOnce<Arc<dyn CatalogService>> = AsyncOnce::new(async {
                memory_service()
            });
    }

    #[tokio::test]
    async fn test_should_run_create_quote() {
        let svc = SUT_SVC.get().await.clone();
        let ctx = RequestContext::background();
        let author = CreateAuthorCommand::new(svc.clone())
            .execute(&ctx, CreateAuthorCommandRequest::new("Khalil Gibran", None))
            .await.expect("should create author");
        let res = CreateQuoteCommand::new(svc)
            .execute(&ctx, CreateQuoteCommandRequest {
                quote: QuoteParams::new("Out of suffering", author.author.id).with_tags(&["strength"]),
            })
            .await.expect("should create quote");
        assert_eq!(author.author.id, res.quote.author_id);
        assert_eq!(vec!["strength".to_string()], res.quote.tags);
    }

    #[tokio::test]
    async fn test_should_reject_invalid_quote() {
        let svc = SUT_SVC.get().await.clone();
        let ctx = RequestContext::background();
        let cmd = CreateQuoteCommand::new(svc);
        let err = cmd.execute(&ctx, CreateQuoteCommandRequest { quote: QuoteParams::new("", 1) })
            .await.expect_err("should reject empty content");
        assert!(matches!(err, CommandError::Validation { .. }));
        let err = cmd.execute(&ctx, CreateQuoteCommandRequest { quote: QuoteParams::new("orphan", i64::MAX) })
            .await.expect_err("should reject missing author");
        assert!(matches!(err, CommandError::NotFound { .. }));
        assert!(err.message().contains("author not found"));
    }
}
