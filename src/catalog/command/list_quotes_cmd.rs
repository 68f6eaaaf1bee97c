use std::sync::Arc;
use async_trait::async_trait;
use serde::Deserialize;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::context::RequestContext;
use crate::core::controller::PageBody;
use crate::core::library::ListParams;
use crate::quotes::dto::QuoteWithAuthorDto;

pub(crate) struct ListQuotesCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl ListQuotesCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

// author_id narrows the listing to one author, who must exist.
#[derive(Debug, Deserialize)]
pub(crate) struct ListQuotesCommandRequest {
    pub(crate) author_id: Option<i64>,
    pub(crate) page: ListParams,
}

pub(crate) type ListQuotesCommandResponse = PageBody<QuoteWithAuthorDto>;

#[async_trait]
impl Command<ListQuotesCommandRequest, ListQuotesCommandResponse> for ListQuotesCommand {
    async fn execute(&self, ctx: &RequestContext, req: ListQuotesCommandRequest) -> Result<ListQuotesCommandResponse, CommandError> {
        let res = match req.author_id {
            Some(author_id) => {
                self.catalog_service.list_quotes_by_author(ctx, author_id, &req.page).await
            }
            None => {
                self.catalog_service.list_quotes(ctx, &req.page).await
            }
        };
        res.map_err(CommandError::from).map(PageBody::from)
    }
}

#[cfg(test)]
mod tests {
    use crate::authors::domain::model::AuthorParams;
    use crate::catalog::command::list_quotes_cmd::{ListQuotesCommand, ListQuotesCommandRequest};
    use crate::catalog::command::memory_service;
    use crate::catalog::domain::CatalogService;
    use crate::core::command::{Command, CommandError};
    use crate::core::context::RequestContext;
    use crate::core::library::ListParams;
    use crate::quotes::domain::model::QuoteParams;

    #[tokio::test]
    async fn test_should_run_list_quotes() {
        let svc = memory_service();
        let ctx = RequestContext::background();
        let first = svc.create_author(&ctx, &AuthorParams::new("Zeno", None)).await.expect("should create author");
        let second = svc.create_author(&ctx, &AuthorParams::new("Chrysippus", None)).await.expect("should create author");
        for (i, author_id) in [first.id, second.id, second.id].iter().enumerate() {
            let _ = svc.create_quote(&ctx, &QuoteParams::new(format!("quote {}", i).as_str(), *author_id))
                .await.expect("should create quote");
        }

        let cmd = ListQuotesCommand::new(svc);
        let res = cmd.execute(&ctx, ListQuotesCommandRequest { author_id: None, page: ListParams::default() })
            .await.expect("should list quotes");
        assert_eq!(3, res.meta.total);
        let res = cmd.execute(&ctx, ListQuotesCommandRequest { author_id: Some(second.id), page: ListParams::new(1, 0) })
            .await.expect("should list quotes");
        assert_eq!(2, res.meta.total);
        assert_eq!(1, res.data.len());
        assert_eq!("Chrysippus", res.data[0].author_name.as_str());
        let err = cmd.execute(&ctx, ListQuotesCommandRequest { author_id: Some(404), page: ListParams::default() })
            .await.expect_err("should be missing");
        assert!(matches!(err, CommandError::NotFound { .. }));
    }
}
