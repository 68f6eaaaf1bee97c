use std::sync::Arc;
use async_trait::async_trait;
use crate::authors::domain::model::AuthorParams;
use crate::authors::dto::AuthorDto;
use crate::catalog::domain::CatalogService;
use crate::core::context::RequestContext;
use crate::core::domain::{Configuration, Identifiable};
use crate::core::library::{CatalogError, CatalogResult, ListParams, PaginatedResult};
use crate::core::repository::{Repositories, RowLock};
use crate::core::transaction::{with_transaction, TransactionCoordinator};
use crate::quotes::domain::model::QuoteParams;
use crate::quotes::dto::{QuoteDto, QuoteWithAuthorDto};

// CatalogServiceImpl keeps the author/quote invariants. Every check that guards
// a write runs in the same transaction as the write.
pub(crate) struct CatalogServiceImpl {
    repositories: Repositories,
    coordinator: Arc<dyn TransactionCoordinator>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(_config: &Configuration, repositories: Repositories,
                      coordinator: Arc<dyn TransactionCoordinator>) -> Self {
        Self {
            repositories,
            coordinator,
        }
    }
}

fn author_not_found(err: CatalogError) -> CatalogError {
    if err.is_not_found() {
        CatalogError::not_found("author not found")
    } else {
        err
    }
}

fn quote_not_found(err: CatalogError) -> CatalogError {
    if err.is_not_found() {
        CatalogError::not_found("quote not found")
    } else {
        err
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn create_author(&self, ctx: &RequestContext, params: &AuthorParams) -> CatalogResult<AuthorDto> {
        let author = with_transaction(self.coordinator.as_ref(), ctx, |repos| Box::pin(async move {
            repos.authors.lock_name(ctx, params.name.as_str()).await?;
            let existing = repos.authors.search(ctx, params.name.as_str(), &ListParams::first()).await?;
            if existing.first().map(|a| a.name == params.name).unwrap_or(false) {
                return Err(CatalogError::conflict(
                    format!("author with name {:?} already exists", params.name).as_str(),
                    Some("duplicate_name".to_string())));
            }
            repos.authors.create(ctx, params).await
        })).await.map_err(|err| err.context("failed to create author"))?;
        tracing::info!(request_id = ctx.request_id.as_str(), author_id = author.id(), "author created");
        Ok(AuthorDto::from(author))
    }

    async fn get_author(&self, ctx: &RequestContext, id: i64) -> CatalogResult<AuthorDto> {
        self.repositories.authors.get(ctx, id).await
            .map(AuthorDto::from)
            .map_err(|err| author_not_found(err).context("failed to get author"))
    }

    async fn list_authors(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<PaginatedResult<AuthorDto>> {
        let total = self.repositories.authors.count(ctx).await
            .map_err(|err| err.context("failed to count authors"))?;
        let records = self.repositories.authors.list(ctx, params).await
            .map_err(|err| err.context("failed to list authors"))?;
        tracing::debug!(request_id = ctx.request_id.as_str(), total, returned = records.len(), "authors listed");
        Ok(PaginatedResult::new(params, total, records.into_iter().map(AuthorDto::from).collect()))
    }

    async fn update_author(&self, ctx: &RequestContext, id: i64, params: &AuthorParams) -> CatalogResult<AuthorDto> {
        let author = with_transaction(self.coordinator.as_ref(), ctx, |repos| Box::pin(async move {
            let _ = repos.authors.get_locked(ctx, id, RowLock::Exclusive).await.map_err(author_not_found)?;
            repos.authors.update(ctx, id, params).await.map_err(author_not_found)
        })).await.map_err(|err| err.context("failed to update author"))?;
        tracing::info!(request_id = ctx.request_id.as_str(), author_id = id, "author updated");
        Ok(AuthorDto::from(author))
    }

    async fn delete_author(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()> {
        with_transaction(self.coordinator.as_ref(), ctx, |repos| Box::pin(async move {
            let _ = repos.authors.get_locked(ctx, id, RowLock::Exclusive).await.map_err(author_not_found)?;
            let quotes = repos.quotes.list_by_author(ctx, id, &ListParams::first()).await?;
            if !quotes.is_empty() {
                return Err(CatalogError::conflict("cannot delete author with existing quotes",
                                                  Some("author_has_quotes".to_string())));
            }
            repos.authors.delete(ctx, id).await.map_err(author_not_found)
        })).await.map_err(|err| err.context("failed to delete author"))?;
        tracing::info!(request_id = ctx.request_id.as_str(), author_id = id, "author deleted");
        Ok(())
    }

    async fn search_authors(&self, ctx: &RequestContext, query: &str,
                            params: &ListParams) -> CatalogResult<PaginatedResult<AuthorDto>> {
        let records = self.repositories.authors.search(ctx, query, params).await
            .map_err(|err| err.context("failed to search authors"))?;
        let total = self.repositories.authors.count_search(ctx, query).await
            .map_err(|err| err.context("failed to count authors"))?;
        tracing::debug!(request_id = ctx.request_id.as_str(), query, total, "authors searched");
        Ok(PaginatedResult::new(params, total, records.into_iter().map(AuthorDto::from).collect()))
    }

    async fn create_quote(&self, ctx: &RequestContext, params: &QuoteParams) -> CatalogResult<QuoteDto> {
        let quote = with_transaction(self.coordinator.as_ref(), ctx, |repos| Box::pin(async move {
            let _ = repos.authors.get_locked(ctx, params.author_id, RowLock::Share).await.map_err(author_not_found)?;
            repos.quotes.create(ctx, params).await.map_err(author_not_found)
        })).await.map_err(|err| err.context("failed to create quote"))?;
        tracing::info!(request_id = ctx.request_id.as_str(), quote_id = quote.id(), author_id = quote.author_id,
            "quote created");
        Ok(QuoteDto::from(quote))
    }

    async fn get_quote(&self, ctx: &RequestContext, id: i64) -> CatalogResult<QuoteWithAuthorDto> {
        self.repositories.quotes.get(ctx, id).await
            .map(QuoteWithAuthorDto::from)
            .map_err(|err| quote_not_found(err).context("failed to get quote"))
    }

    async fn list_quotes(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<PaginatedResult<QuoteWithAuthorDto>> {
        let total = self.repositories.quotes.count(ctx).await
            .map_err(|err| err.context("failed to count quotes"))?;
        let records = self.repositories.quotes.list(ctx, params).await
            .map_err(|err| err.context("failed to list quotes"))?;
        tracing::debug!(request_id = ctx.request_id.as_str(), total, returned = records.len(), "quotes listed");
        Ok(PaginatedResult::new(params, total, records.into_iter().map(QuoteWithAuthorDto::from).collect()))
    }

    async fn list_quotes_by_author(&self, ctx: &RequestContext, author_id: i64,
                                   params: &ListParams) -> CatalogResult<PaginatedResult<QuoteWithAuthorDto>> {
        // an unknown author is NotFound rather than an empty page
        let _ = self.repositories.authors.get(ctx, author_id).await
            .map_err(|err| author_not_found(err).context("failed to list quotes by author"))?;
        let records = self.repositories.quotes.list_by_author(ctx, author_id, params).await
            .map_err(|err| err.context("failed to list quotes by author"))?;
        let total = self.repositories.quotes.count_by_author(ctx, author_id).await
            .map_err(|err| err.context("failed to count quotes by author"))?;
        Ok(PaginatedResult::new(params, total, records.into_iter().map(QuoteWithAuthorDto::from).collect()))
    }

    async fn update_quote(&self, ctx: &RequestContext, id: i64, params: &QuoteParams) -> CatalogResult<QuoteDto> {
        let quote = with_transaction(self.coordinator.as_ref(), ctx, |repos| Box::pin(async move {
            let _ = repos.quotes.get(ctx, id).await.map_err(quote_not_found)?;
            // author_id may change, so the reference is checked on every update
            let _ = repos.authors.get_locked(ctx, params.author_id, RowLock::Share).await.map_err(author_not_found)?;
            repos.quotes.update(ctx, id, params).await
        })).await.map_err(|err| err.context("failed to update quote"))?;
        tracing::info!(request_id = ctx.request_id.as_str(), quote_id = id, author_id = quote.author_id,
            "quote updated");
        Ok(QuoteDto::from(quote))
    }

    async fn delete_quote(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()> {
        self.repositories.quotes.delete(ctx, id).await
            .map_err(|err| quote_not_found(err).context("failed to delete quote"))?;
        tracing::info!(request_id = ctx.request_id.as_str(), quote_id = id, "quote deleted");
        Ok(())
    }

    async fn search_quotes(&self, ctx: &RequestContext, query: &str,
                           params: &ListParams) -> CatalogResult<PaginatedResult<QuoteWithAuthorDto>> {
        let records = self.repositories.quotes.search(ctx, query, params).await
            .map_err(|err| err.context("failed to search quotes"))?;
        let total = self.repositories.quotes.count_search(ctx, query).await
            .map_err(|err| err.context("failed to count quotes"))?;
        tracing::debug!(request_id = ctx.request_id.as_str(), query, total, "quotes searched");
        Ok(PaginatedResult::new(params, total, records.into_iter().map(QuoteWithAuthorDto::from).collect()))
    }

    async fn get_random_quote(&self, ctx: &RequestContext) -> CatalogResult<QuoteWithAuthorDto> {
        self.repositories.quotes.get_random(ctx).await
            .map(QuoteWithAuthorDto::from)
            .map_err(|err| err.context("failed to get random quote"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use uuid::Uuid;
    use crate::authors::domain::model::AuthorParams;
    use crate::authors::dto::AuthorDto;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::factory;
    use crate::core::context::RequestContext;
    use crate::core::domain::Configuration;
    use crate::core::library::{CatalogError, ListParams};
    use crate::core::repository::{RepositoryStore, StorageBackend};
    use crate::quotes::domain::model::QuoteParams;
    use crate::utils::memory::MemoryStore;

    lazy_static! {
        static ref SUT_SVC: AsyncOnce<Arc<dyn CatalogService>> = AsyncOnce::new(async {
                let config = Configuration::new("test", RepositoryStore::Memory);
                let backend = StorageBackend::connect(&config).await.expect("should connect");
                factory::create_catalog_service(&config, &backend)
            });
    }

    // fresh_service is for tests that assert on totals or ordering
    fn fresh_service() -> Arc<dyn CatalogService> {
        let config = Configuration::new("test", RepositoryStore::Memory);
        factory::create_catalog_service(&config, &StorageBackend::Memory(MemoryStore::new()))
    }

    async fn add_author(svc: &Arc<dyn CatalogService>) -> AuthorDto {
        let name = format!("author {}", Uuid::new_v4());
        svc.create_author(&RequestContext::background(), &AuthorParams::new(name.as_str(), Some("bio")))
            .await.expect("should create author")
    }

    #[tokio::test]
    async fn test_should_create_get_author() {
        let catalog_svc = SUT_SVC.get().await.clone();
        let ctx = RequestContext::background();
        let name = format!("author {}", Uuid::new_v4());
        let author = catalog_svc.create_author(&ctx, &AuthorParams::new(name.as_str(), Some("wrote things")))
            .await.expect("should create author");
        assert!(author.id > 0);
        assert_eq!(name, author.name);
        assert_eq!(Some("wrote things".to_string()), author.bio);

        let loaded = catalog_svc.get_author(&ctx, author.id).await.expect("should return author");
        assert_eq!(author, loaded);
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_author_name() {
        let catalog_svc = SUT_SVC.get().await.clone();
        let ctx = RequestContext::background();
        let author = add_author(&catalog_svc).await;
        let err = catalog_svc.create_author(&ctx, &AuthorParams::new(author.name.as_str(), None))
            .await.expect_err("should reject duplicate");
        assert!(matches!(err, CatalogError::Conflict { reason_code: Some(ref code), .. } if code == "duplicate_name"));

        // only an exact, case-sensitive match counts as a duplicate
        let _ = catalog_svc.create_author(&ctx, &AuthorParams::new(author.name.to_uppercase().as_str(), None))
            .await.expect("should create author");
        let _ = catalog_svc.create_author(&ctx, &AuthorParams::new(format!("{} II", author.name).as_str(), None))
            .await.expect("should create author");
    }

    #[tokio::test]
    async fn test_should_allow_one_of_concurrent_duplicates() {
        let catalog_svc = fresh_service();
        let ctx = RequestContext::background();
        let params = AuthorParams::new("Lao Tzu", None);
        let (first, second) = tokio::join!(
            catalog_svc.create_author(&ctx, &params),
            catalog_svc.create_author(&ctx, &params));
        assert_eq!(1, [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count());
        assert_eq!(1, catalog_svc.list_authors(&ctx, &ListParams::default()).await.expect("should list").total);
    }

    // every listed quote must still have its author
    async fn assert_no_orphaned_quotes(svc: &Arc<dyn CatalogService>) {
        let ctx = RequestContext::background();
        let page = svc.list_quotes(&ctx, &ListParams::new(100, 0)).await.expect("should list quotes");
        for quote in page.records {
            let _ = svc.get_author(&ctx, quote.quote.author_id).await.expect("quote author should exist");
        }
    }

    #[tokio::test]
    async fn test_should_not_orphan_quote_created_during_delete() {
        let catalog_svc = fresh_service();
        let ctx = RequestContext::background();
        for _ in 0..10 {
            let author = add_author(&catalog_svc).await;
            let params = QuoteParams::new("racing", author.id);
            let (deleted, created) = tokio::join!(
                catalog_svc.delete_author(&ctx, author.id),
                catalog_svc.create_quote(&ctx, &params));
            match (deleted, created) {
                (Ok(_), Err(err)) => { assert!(err.is_not_found()) }
                (Err(err), Ok(_)) => { assert!(err.is_conflict()) }
                other => panic!("exactly one side should win: {:?}", other),
            }
        }
        assert_no_orphaned_quotes(&catalog_svc).await;
    }

    #[tokio::test]
    async fn test_should_not_orphan_quote_moved_during_delete() {
        let catalog_svc = fresh_service();
        let ctx = RequestContext::background();
        for _ in 0..10 {
            let current = add_author(&catalog_svc).await;
            let target = add_author(&catalog_svc).await;
            let quote = catalog_svc.create_quote(&ctx, &QuoteParams::new("moving", current.id))
                .await.expect("should create quote");
            let params = QuoteParams::new("moved", target.id);
            let (deleted, moved) = tokio::join!(
                catalog_svc.delete_author(&ctx, target.id),
                catalog_svc.update_quote(&ctx, quote.id, &params));
            match (deleted, moved) {
                (Ok(_), Err(err)) => {
                    assert!(err.is_not_found());
                    let stored = catalog_svc.get_quote(&ctx, quote.id).await.expect("should return quote");
                    assert_eq!(current.id, stored.quote.author_id);
                }
                (Err(err), Ok(moved)) => {
                    assert!(err.is_conflict());
                    assert_eq!(target.id, moved.author_id);
                }
                other => panic!("exactly one side should win: {:?}", other),
            }
        }
        assert_no_orphaned_quotes(&catalog_svc).await;
    }

    #[tokio::test]
    async fn test_should_update_author() {
        let catalog_svc = SUT_SVC.get().await.clone();
        let ctx = RequestContext::background();
        let author = add_author(&catalog_svc).await;
        let updated = catalog_svc.update_author(&ctx, author.id, &AuthorParams::new("renamed", None))
            .await.expect("should update author");
        assert_eq!("renamed", updated.name.as_str());
        assert_eq!(None, updated.bio);

        let err = catalog_svc.update_author(&ctx, i64::MAX, &AuthorParams::new("nobody", None))
            .await.expect_err("should be missing");
        assert!(err.is_not_found());
        assert!(err.message().starts_with("failed to update author"));
    }

    #[tokio::test]
    async fn test_should_guard_author_with_quotes() {
        let catalog_svc = SUT_SVC.get().await.clone();
        let ctx = RequestContext::background();
        let author = add_author(&catalog_svc).await;
        let quote = catalog_svc.create_quote(&ctx, &QuoteParams::new("keep me", author.id))
            .await.expect("should create quote");

        let err = catalog_svc.delete_author(&ctx, author.id).await.expect_err("should be guarded");
        assert!(err.is_conflict());
        assert!(err.message().contains("cannot delete author with existing quotes"));
        assert_eq!(author, catalog_svc.get_author(&ctx, author.id).await.expect("should still exist"));
        assert_eq!(author.id, catalog_svc.get_quote(&ctx, quote.id).await.expect("should still exist").quote.author_id);

        catalog_svc.delete_quote(&ctx, quote.id).await.expect("should delete quote");
        catalog_svc.delete_author(&ctx, author.id).await.expect("should delete author");
        assert!(catalog_svc.get_author(&ctx, author.id).await.expect_err("should be gone").is_not_found());
        assert!(catalog_svc.delete_author(&ctx, author.id).await.expect_err("should be gone").is_not_found());
    }

    #[tokio::test]
    async fn test_should_reject_quote_for_missing_author() {
        let catalog_svc = fresh_service();
        let ctx = RequestContext::background();
        let err = catalog_svc.create_quote(&ctx, &QuoteParams::new("orphan", 404))
            .await.expect_err("should reject");
        assert!(err.is_not_found());
        assert!(err.message().contains("author not found"));
        assert_eq!(0, catalog_svc.list_quotes(&ctx, &ListParams::default()).await.expect("should list").total);
    }

    #[tokio::test]
    async fn test_should_round_trip_quote() {
        let catalog_svc = SUT_SVC.get().await.clone();
        let ctx = RequestContext::background();
        let author = add_author(&catalog_svc).await;
        let params = QuoteParams::new("The unexamined life", author.id)
            .with_source("Apology")
            .with_tags(&["life", "examined"]);
        let quote = catalog_svc.create_quote(&ctx, &params).await.expect("should create quote");
        assert!(quote.id > 0);

        let loaded = catalog_svc.get_quote(&ctx, quote.id).await.expect("should return quote");
        assert_eq!(params.content, loaded.quote.content);
        assert_eq!(params.author_id, loaded.quote.author_id);
        assert_eq!(params.source, loaded.quote.source);
        assert_eq!(params.tags, loaded.quote.tags);
        assert_eq!(author.name, loaded.author_name);
        assert_eq!(author.bio, loaded.author_bio);
        assert_eq!(quote.created_at, loaded.quote.created_at);
    }

    #[tokio::test]
    async fn test_should_revalidate_author_on_quote_update() {
        let catalog_svc = SUT_SVC.get().await.clone();
        let ctx = RequestContext::background();
        let author = add_author(&catalog_svc).await;
        let other = add_author(&catalog_svc).await;
        let quote = catalog_svc.create_quote(&ctx, &QuoteParams::new("moving", author.id))
            .await.expect("should create quote");

        let err = catalog_svc.update_quote(&ctx, quote.id, &QuoteParams::new("moving", i64::MAX))
            .await.expect_err("should reject");
        assert!(err.is_not_found());
        assert!(err.message().contains("author not found"));
        assert_eq!(author.id, catalog_svc.get_quote(&ctx, quote.id).await.expect("should return quote").quote.author_id);

        let moved = catalog_svc.update_quote(&ctx, quote.id, &QuoteParams::new("moved", other.id))
            .await.expect("should update quote");
        assert_eq!(other.id, moved.author_id);
        assert_eq!("moved", moved.content.as_str());

        let err = catalog_svc.update_quote(&ctx, i64::MAX, &QuoteParams::new("ghost", other.id))
            .await.expect_err("should be missing");
        assert!(err.message().contains("quote not found"));
    }

    #[tokio::test]
    async fn test_should_paginate_authors() {
        let catalog_svc = fresh_service();
        let ctx = RequestContext::background();
        let mut ids = vec![];
        for _ in 0..7 {
            ids.push(add_author(&catalog_svc).await.id);
        }
        let page = catalog_svc.list_authors(&ctx, &ListParams::new(3, 2)).await.expect("should list authors");
        assert_eq!(7, page.total);
        assert_eq!(3, page.limit);
        assert_eq!(2, page.offset);
        assert_eq!(ids[2..5].to_vec(), page.records.iter().map(|a| a.id).collect::<Vec<i64>>());

        let page = catalog_svc.list_authors(&ctx, &ListParams::new(150, -5)).await.expect("should list authors");
        assert_eq!(100, page.limit);
        assert_eq!(0, page.offset);
        assert_eq!(7, page.records.len());

        let page = catalog_svc.list_authors(&ctx, &ListParams::new(5, 6)).await.expect("should list authors");
        assert_eq!(vec![ids[6]], page.records.iter().map(|a| a.id).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_should_list_quotes_by_author() {
        let catalog_svc = fresh_service();
        let ctx = RequestContext::background();
        let author = add_author(&catalog_svc).await;
        let other = add_author(&catalog_svc).await;
        for i in 0..3 {
            let _ = catalog_svc.create_quote(&ctx, &QuoteParams::new(format!("mine {}", i).as_str(), author.id))
                .await.expect("should create quote");
        }
        let _ = catalog_svc.create_quote(&ctx, &QuoteParams::new("theirs", other.id))
            .await.expect("should create quote");

        let page = catalog_svc.list_quotes_by_author(&ctx, author.id, &ListParams::new(2, 0))
            .await.expect("should list quotes");
        assert_eq!(3, page.total);
        assert_eq!(2, page.records.len());
        assert!(page.records.iter().all(|q| q.quote.author_id == author.id));

        let err = catalog_svc.list_quotes_by_author(&ctx, i64::MAX, &ListParams::default())
            .await.expect_err("should be missing");
        assert!(err.is_not_found());

        let page = catalog_svc.list_quotes(&ctx, &ListParams::default()).await.expect("should list quotes");
        assert_eq!(4, page.total);
    }

    #[tokio::test]
    async fn test_should_search_with_true_totals() {
        let catalog_svc = fresh_service();
        let ctx = RequestContext::background();
        let author = catalog_svc.create_author(&ctx, &AuthorParams::new("Heraclitus", None))
            .await.expect("should create author");
        let _ = catalog_svc.create_author(&ctx, &AuthorParams::new("Parmenides", None))
            .await.expect("should create author");
        for i in 0..5 {
            let _ = catalog_svc.create_quote(&ctx, &QuoteParams::new(format!("No river {}", i).as_str(), author.id))
                .await.expect("should create quote");
        }

        let page = catalog_svc.search_quotes(&ctx, "RIVER", &ListParams::new(2, 0)).await.expect("should search");
        assert_eq!(5, page.total);
        assert_eq!(2, page.records.len());
        assert_eq!("Heraclitus", page.records[0].author_name.as_str());

        let page = catalog_svc.search_authors(&ctx, "ides", &ListParams::default()).await.expect("should search");
        assert_eq!(1, page.total);
        assert_eq!("Parmenides", page.records[0].name.as_str());
    }

    #[tokio::test]
    async fn test_should_get_random_quote() {
        let catalog_svc = fresh_service();
        let ctx = RequestContext::background();
        let err = catalog_svc.get_random_quote(&ctx).await.expect_err("should be empty");
        assert!(err.is_not_found());
        assert!(err.message().contains("no quotes found"));

        let author = add_author(&catalog_svc).await;
        let mut ids = HashSet::new();
        for i in 0..4 {
            let quote = catalog_svc.create_quote(&ctx, &QuoteParams::new(format!("q {}", i).as_str(), author.id))
                .await.expect("should create quote");
            ids.insert(quote.id);
        }
        for _ in 0..8 {
            let random = catalog_svc.get_random_quote(&ctx).await.expect("should return quote");
            assert!(ids.contains(&random.quote.id));
        }
    }
}
