use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::sync::Mutex;
use crate::core::context::RequestContext;
use crate::core::library::{CatalogError, CatalogResult, ListParams};
use crate::core::repository::Repository;
use crate::quotes::domain::model::{QuoteEntity, QuoteParams, QuoteWithAuthorEntity};
use crate::quotes::repository::QuoteRepository;
use crate::utils::memory::{like_match, lock_state, MemoryState};

#[derive(Debug, Clone)]
pub struct MemoryQuoteRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryQuoteRepository {
    pub(crate) fn new(state: Arc<Mutex<MemoryState>>) -> Self {
        Self {
            state,
        }
    }

    fn not_found(id: i64) -> CatalogError {
        CatalogError::not_found(format!("quote not found for {}", id).as_str())
    }

    fn check_author(state: &MemoryState, author_id: i64) -> CatalogResult<()> {
        if state.authors.contains_key(&author_id) {
            Ok(())
        } else {
            Err(CatalogError::not_found(format!("author not found for {}", author_id).as_str()))
        }
    }

    // joins a stored quote with its author the way the postgres view does;
    // quotes whose author is gone are skipped like an inner join would
    fn with_author(state: &MemoryState, quote: &QuoteEntity) -> Option<QuoteWithAuthorEntity> {
        state.authors.get(&quote.author_id).map(|author| QuoteWithAuthorEntity {
            quote: quote.clone(),
            author_name: author.name.clone(),
            author_bio: author.bio.clone(),
        })
    }

    fn page<'a, I: Iterator<Item=&'a QuoteEntity>>(state: &MemoryState, quotes: I,
                                                   params: &ListParams) -> Vec<QuoteWithAuthorEntity> {
        quotes.filter_map(|q| Self::with_author(state, q))
            .skip(params.offset as usize)
            .take(params.limit as usize)
            .collect()
    }
}

#[async_trait]
impl Repository<QuoteEntity, QuoteWithAuthorEntity, QuoteParams> for MemoryQuoteRepository {
    async fn create(&self, ctx: &RequestContext, params: &QuoteParams) -> CatalogResult<QuoteEntity> {
        let mut state = lock_state(&self.state, ctx).await?;
        Self::check_author(&state, params.author_id)?;
        let now = Utc::now().naive_utc();
        let quote = QuoteEntity {
            id: state.next_quote_id(),
            content: params.content.clone(),
            author_id: params.author_id,
            source: params.source.clone(),
            tags: params.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        state.quotes.insert(quote.id, quote.clone());
        Ok(quote)
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> CatalogResult<QuoteWithAuthorEntity> {
        let state = lock_state(&self.state, ctx).await?;
        state.quotes.get(&id)
            .and_then(|q| Self::with_author(&state, q))
            .ok_or_else(|| Self::not_found(id))
    }

    async fn list(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<Vec<QuoteWithAuthorEntity>> {
        let state = lock_state(&self.state, ctx).await?;
        Ok(Self::page(&state, state.quotes.values(), params))
    }

    async fn update(&self, ctx: &RequestContext, id: i64, params: &QuoteParams) -> CatalogResult<QuoteEntity> {
        let mut state = lock_state(&self.state, ctx).await?;
        if !state.quotes.contains_key(&id) {
            return Err(Self::not_found(id));
        }
        Self::check_author(&state, params.author_id)?;
        let quote = state.quotes.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        quote.content = params.content.clone();
        quote.author_id = params.author_id;
        quote.source = params.source.clone();
        quote.tags = params.tags.clone();
        quote.updated_at = Utc::now().naive_utc();
        Ok(quote.clone())
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()> {
        let mut state = lock_state(&self.state, ctx).await?;
        state.quotes.remove(&id).map(|_| ()).ok_or_else(|| Self::not_found(id))
    }

    async fn count(&self, ctx: &RequestContext) -> CatalogResult<i64> {
        let state = lock_state(&self.state, ctx).await?;
        Ok(state.quotes.len() as i64)
    }

    async fn search(&self, ctx: &RequestContext, query: &str, params: &ListParams) -> CatalogResult<Vec<QuoteWithAuthorEntity>> {
        let state = lock_state(&self.state, ctx).await?;
        let matched = state.quotes.values().filter(|q| like_match(q.content.as_str(), query));
        Ok(Self::page(&state, matched, params))
    }

    async fn count_search(&self, ctx: &RequestContext, query: &str) -> CatalogResult<i64> {
        let state = lock_state(&self.state, ctx).await?;
        Ok(state.quotes.values().filter(|q| like_match(q.content.as_str(), query)).count() as i64)
    }
}

#[async_trait]
impl QuoteRepository for MemoryQuoteRepository {
    async fn list_by_author(&self, ctx: &RequestContext, author_id: i64,
                            params: &ListParams) -> CatalogResult<Vec<QuoteWithAuthorEntity>> {
        let state = lock_state(&self.state, ctx).await?;
        let matched = state.quotes.values().filter(|q| q.author_id == author_id);
        Ok(Self::page(&state, matched, params))
    }

    async fn count_by_author(&self, ctx: &RequestContext, author_id: i64) -> CatalogResult<i64> {
        let state = lock_state(&self.state, ctx).await?;
        Ok(state.quotes.values().filter(|q| q.author_id == author_id).count() as i64)
    }

    async fn get_random(&self, ctx: &RequestContext) -> CatalogResult<QuoteWithAuthorEntity> {
        let state = lock_state(&self.state, ctx).await?;
        if state.quotes.is_empty() {
            return Err(CatalogError::not_found("no quotes found"));
        }
        let pick = rand::thread_rng().gen_range(0..state.quotes.len());
        state.quotes.values()
            .nth(pick)
            .and_then(|q| Self::with_author(&state, q))
            .ok_or_else(|| CatalogError::not_found("no quotes found"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use crate::authors::domain::model::AuthorParams;
    use crate::authors::repository::memory_author_repository::MemoryAuthorRepository;
    use crate::core::context::RequestContext;
    use crate::core::library::ListParams;
    use crate::core::repository::Repository;
    use crate::quotes::domain::model::QuoteParams;
    use crate::quotes::repository::QuoteRepository;
    use crate::quotes::repository::memory_quote_repository::MemoryQuoteRepository;
    use crate::utils::memory::{MemoryState, MemoryStore};

    async fn repos() -> (MemoryAuthorRepository, MemoryQuoteRepository) {
        let state: Arc<Mutex<MemoryState>> = MemoryStore::new().shared();
        let authors_repo = MemoryAuthorRepository::new(state.clone());
        let _ = authors_repo.create(&RequestContext::background(), &AuthorParams::new("Confucius", Some("Philosopher")))
            .await.expect("should create author");
        (authors_repo, MemoryQuoteRepository::new(state))
    }

    #[tokio::test]
    async fn test_should_create_get_quotes() {
        let ctx = RequestContext::background();
        let (_, quotes_repo) = repos().await;
        let quote = quotes_repo.create(&ctx, &QuoteParams::new("Real knowledge", 1).with_tags(&["b", "a"]))
            .await.expect("should create quote");
        let loaded = quotes_repo.get(&ctx, quote.id).await.expect("should return quote");
        assert_eq!(quote, loaded.quote);
        assert_eq!("Confucius", loaded.author_name.as_str());
        assert_eq!(Some("Philosopher".to_string()), loaded.author_bio);
        assert_eq!(vec!["b".to_string(), "a".to_string()], loaded.quote.tags);
    }

    #[tokio::test]
    async fn test_should_enforce_author_reference() {
        let ctx = RequestContext::background();
        let (authors_repo, quotes_repo) = repos().await;
        assert!(quotes_repo.create(&ctx, &QuoteParams::new("orphan", 42))
            .await.expect_err("should fail").is_not_found());
        assert_eq!(0, quotes_repo.count(&ctx).await.expect("should count"));

        let quote = quotes_repo.create(&ctx, &QuoteParams::new("kept", 1)).await.expect("should create quote");
        assert!(quotes_repo.update(&ctx, quote.id, &QuoteParams::new("moved", 42))
            .await.expect_err("should fail").is_not_found());
        assert_eq!(1, quotes_repo.get(&ctx, quote.id).await.expect("should return quote").quote.author_id);
        assert!(authors_repo.delete(&ctx, 1).await.expect_err("should be restricted").is_conflict());
    }

    #[tokio::test]
    async fn test_should_update_delete_quotes() {
        let ctx = RequestContext::background();
        let (_, quotes_repo) = repos().await;
        let quote = quotes_repo.create(&ctx, &QuoteParams::new("first", 1)).await.expect("should create quote");
        let updated = quotes_repo.update(&ctx, quote.id, &QuoteParams::new("second", 1).with_source("Analects"))
            .await.expect("should update quote");
        assert_eq!("second", updated.content.as_str());
        assert_eq!(Some("Analects".to_string()), updated.source);
        assert!(quotes_repo.update(&ctx, 99, &QuoteParams::new("x", 1))
            .await.expect_err("should be missing").is_not_found());
        quotes_repo.delete(&ctx, quote.id).await.expect("should delete quote");
        assert!(quotes_repo.delete(&ctx, quote.id).await.expect_err("should be missing").is_not_found());
    }

    #[tokio::test]
    async fn test_should_list_search_and_count() {
        let ctx = RequestContext::background();
        let (authors_repo, quotes_repo) = repos().await;
        let other = authors_repo.create(&ctx, &AuthorParams::new("Laozi", None)).await.expect("should create author");
        for i in 0..4 {
            let _ = quotes_repo.create(&ctx, &QuoteParams::new(format!("The Way {}", i).as_str(), 1))
                .await.expect("should create quote");
        }
        let _ = quotes_repo.create(&ctx, &QuoteParams::new("A journey of a thousand miles", other.id))
            .await.expect("should create quote");

        let page = quotes_repo.list(&ctx, &ListParams::new(2, 3)).await.expect("should list quotes");
        assert_eq!(vec![4, 5], page.iter().map(|q| q.quote.id).collect::<Vec<i64>>());
        let page = quotes_repo.list_by_author(&ctx, 1, &ListParams::new(10, 2)).await.expect("should list quotes");
        assert_eq!(vec![3, 4], page.iter().map(|q| q.quote.id).collect::<Vec<i64>>());
        assert_eq!(4, quotes_repo.count_by_author(&ctx, 1).await.expect("should count"));
        assert_eq!(1, quotes_repo.count_by_author(&ctx, other.id).await.expect("should count"));
        assert_eq!(4, quotes_repo.count_search(&ctx, "the way").await.expect("should count"));
        let found = quotes_repo.search(&ctx, "WAY", &ListParams::new(3, 0)).await.expect("should search");
        assert_eq!(3, found.len());
    }

    #[tokio::test]
    async fn test_should_pick_random_quote() {
        let ctx = RequestContext::background();
        let (_, quotes_repo) = repos().await;
        assert!(quotes_repo.get_random(&ctx).await.expect_err("should be empty").is_not_found());
        let mut ids = HashSet::new();
        for i in 0..3 {
            let quote = quotes_repo.create(&ctx, &QuoteParams::new(format!("quote {}", i).as_str(), 1))
                .await.expect("should create quote");
            ids.insert(quote.id);
        }
        for _ in 0..10 {
            let random = quotes_repo.get_random(&ctx).await.expect("should return quote");
            assert!(ids.contains(&random.quote.id));
        }
    }
}
