use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use crate::authors::repository::memory_author_repository::MemoryAuthorRepository;
use crate::core::context::RequestContext;
use crate::core::library::CatalogResult;
use crate::core::repository::Repositories;
use crate::core::transaction::{TransactionCoordinator, TransactionScope};
use crate::quotes::repository::memory_quote_repository::MemoryQuoteRepository;
use crate::utils::memory::{lock_state, MemoryState, MemoryStore};

#[derive(Debug, Clone)]
pub struct MemoryTransactionCoordinator {
    store: MemoryStore,
}

impl MemoryTransactionCoordinator {
    pub(crate) fn new(store: MemoryStore) -> Self {
        Self {
            store,
        }
    }
}

#[async_trait]
impl TransactionCoordinator for MemoryTransactionCoordinator {
    async fn begin(&self, ctx: &RequestContext) -> CatalogResult<Box<dyn TransactionScope>> {
        let guard = self.store.lock_owned(ctx).await?;
        let working = Arc::new(Mutex::new((*guard).clone()));
        Ok(Box::new(MemoryTransactionScope { guard, working }))
    }
}

// MemoryTransactionScope holds the store lock for its whole lifetime, so scopes
// are serializable. Writes go to a working copy that replaces the store on commit.
struct MemoryTransactionScope {
    guard: OwnedMutexGuard<MemoryState>,
    working: Arc<Mutex<MemoryState>>,
}

#[async_trait]
impl TransactionScope for MemoryTransactionScope {
    fn repositories(&self) -> Repositories {
        Repositories {
            authors: Arc::new(MemoryAuthorRepository::new(self.working.clone())),
            quotes: Arc::new(MemoryQuoteRepository::new(self.working.clone())),
        }
    }

    async fn commit(self: Box<Self>, ctx: &RequestContext) -> CatalogResult<()> {
        let mut scope = *self;
        let state = lock_state(&scope.working, ctx).await?.clone();
        *scope.guard = state;
        Ok(())
    }

    async fn rollback(self: Box<Self>, _ctx: &RequestContext) -> CatalogResult<()> {
        Ok(())
    }
}
