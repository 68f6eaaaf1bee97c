use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use crate::authors::domain::model::{AuthorEntity, AuthorParams};
use crate::authors::repository::AuthorRepository;
use crate::core::context::RequestContext;
use crate::core::library::{CatalogError, CatalogResult, ListParams};
use crate::core::repository::{Repository, RowLock};
use crate::utils::memory::{like_match, lock_state, MemoryState};

#[derive(Debug, Clone)]
pub struct MemoryAuthorRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryAuthorRepository {
    pub(crate) fn new(state: Arc<Mutex<MemoryState>>) -> Self {
        Self {
            state,
        }
    }

    fn not_found(id: i64) -> CatalogError {
        CatalogError::not_found(format!("author not found for {}", id).as_str())
    }

    fn matching(state: &MemoryState, query: &str) -> Vec<AuthorEntity> {
        let mut matched: Vec<AuthorEntity> = state.authors.values()
            .filter(|a| like_match(a.name.as_str(), query))
            .cloned()
            .collect();
        // same ordering as the postgres adapter: exact name first, then id
        matched.sort_by_key(|a| (a.name != query, a.id));
        matched
    }
}

#[async_trait]
impl Repository<AuthorEntity, AuthorEntity, AuthorParams> for MemoryAuthorRepository {
    async fn create(&self, ctx: &RequestContext, params: &AuthorParams) -> CatalogResult<AuthorEntity> {
        let mut state = lock_state(&self.state, ctx).await?;
        let now = Utc::now().naive_utc();
        let author = AuthorEntity {
            id: state.next_author_id(),
            name: params.name.clone(),
            bio: params.bio.clone(),
            created_at: now,
            updated_at: now,
        };
        state.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> CatalogResult<AuthorEntity> {
        let state = lock_state(&self.state, ctx).await?;
        state.authors.get(&id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn list(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<Vec<AuthorEntity>> {
        let state = lock_state(&self.state, ctx).await?;
        Ok(state.authors.values()
            .skip(params.offset as usize)
            .take(params.limit as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, ctx: &RequestContext, id: i64, params: &AuthorParams) -> CatalogResult<AuthorEntity> {
        let mut state = lock_state(&self.state, ctx).await?;
        let author = state.authors.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        author.name = params.name.clone();
        author.bio = params.bio.clone();
        author.updated_at = Utc::now().naive_utc();
        Ok(author.clone())
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()> {
        let mut state = lock_state(&self.state, ctx).await?;
        if !state.authors.contains_key(&id) {
            return Err(Self::not_found(id));
        }
        if state.has_quotes(id) {
            return Err(CatalogError::conflict(
                format!("author {} is still referenced by quotes", id).as_str(),
                Some("foreign_key_violation".to_string())));
        }
        state.authors.remove(&id);
        Ok(())
    }

    async fn count(&self, ctx: &RequestContext) -> CatalogResult<i64> {
        let state = lock_state(&self.state, ctx).await?;
        Ok(state.authors.len() as i64)
    }

    async fn search(&self, ctx: &RequestContext, query: &str, params: &ListParams) -> CatalogResult<Vec<AuthorEntity>> {
        let state = lock_state(&self.state, ctx).await?;
        Ok(Self::matching(&state, query).into_iter()
            .skip(params.offset as usize)
            .take(params.limit as usize)
            .collect())
    }

    async fn count_search(&self, ctx: &RequestContext, query: &str) -> CatalogResult<i64> {
        let state = lock_state(&self.state, ctx).await?;
        Ok(state.authors.values().filter(|a| like_match(a.name.as_str(), query)).count() as i64)
    }
}

#[async_trait]
impl AuthorRepository for MemoryAuthorRepository {
    // a memory transaction owns the whole store, so row locks are implied
    async fn get_locked(&self, ctx: &RequestContext, id: i64, _lock: RowLock) -> CatalogResult<AuthorEntity> {
        self.get(ctx, id).await
    }

    async fn lock_name(&self, _ctx: &RequestContext, _name: &str) -> CatalogResult<()> {
        Ok(())
    }
}
