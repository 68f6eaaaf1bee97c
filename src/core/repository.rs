use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use crate::authors::factory::create_author_repository;
use crate::authors::repository::AuthorRepository;
use crate::core::context::RequestContext;
use crate::core::domain::Configuration;
use crate::core::library::{CatalogError, CatalogResult, ListParams};
use crate::core::transaction::TransactionCoordinator;
use crate::core::transaction::memory_transaction::MemoryTransactionCoordinator;
use crate::core::transaction::pg_transaction::PgTransactionCoordinator;
use crate::quotes::factory::create_quote_repository;
use crate::quotes::repository::QuoteRepository;
use crate::utils::memory::MemoryStore;
use crate::utils::pg::{build_db_pool, create_tables};

// Repository is the storage contract shared by authors and quotes. Entity is what
// a write returns, View is what a read returns and Params carries the writable fields.
#[async_trait]
pub trait Repository<Entity, View, Params>: Sync + Send {
    // create an entity
    async fn create(&self, ctx: &RequestContext, params: &Params) -> CatalogResult<Entity>;

    // get an entity, NotFound if absent
    async fn get(&self, ctx: &RequestContext, id: i64) -> CatalogResult<View>;

    // list entities in creation order
    async fn list(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<Vec<View>>;

    // updates an entity, NotFound if absent
    async fn update(&self, ctx: &RequestContext, id: i64, params: &Params) -> CatalogResult<Entity>;

    // delete an entity, NotFound if absent
    async fn delete(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()>;

    // total number of rows ignoring pagination
    async fn count(&self, ctx: &RequestContext) -> CatalogResult<i64>;

    // case-insensitive substring match on the primary text field
    async fn search(&self, ctx: &RequestContext, query: &str, params: &ListParams) -> CatalogResult<Vec<View>>;

    // total number of rows matched by search
    async fn count_search(&self, ctx: &RequestContext, query: &str) -> CatalogResult<i64>;
}

// RowLock selects the row lock taken by a locked read inside a transaction scope.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RowLock {
    Share,
    Exclusive,
}

// Repositories bundles the repository views that operate against the same scope.
#[derive(Clone)]
pub struct Repositories {
    pub authors: Arc<dyn AuthorRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryStore {
    Postgres,
    Memory,
}

// StorageBackend owns the shared storage resource: the connection pool or the
// in-memory store.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Postgres(PgPool),
    Memory(MemoryStore),
}

impl StorageBackend {
    pub async fn connect(config: &Configuration) -> CatalogResult<StorageBackend> {
        match config.store {
            RepositoryStore::Postgres => {
                let pool = build_db_pool(config).await?;
                if config.db_create_schema {
                    create_tables(&pool).await?;
                }
                Ok(StorageBackend::Postgres(pool))
            }
            RepositoryStore::Memory => {
                Ok(StorageBackend::Memory(MemoryStore::new()))
            }
        }
    }

    pub fn store(&self) -> RepositoryStore {
        match self {
            StorageBackend::Postgres(_) => { RepositoryStore::Postgres }
            StorageBackend::Memory(_) => { RepositoryStore::Memory }
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            authors: create_author_repository(self),
            quotes: create_quote_repository(self),
        }
    }

    pub fn transaction_coordinator(&self) -> Arc<dyn TransactionCoordinator> {
        match self {
            StorageBackend::Postgres(pool) => {
                Arc::new(PgTransactionCoordinator::new(pool.clone()))
            }
            StorageBackend::Memory(store) => {
                Arc::new(MemoryTransactionCoordinator::new(store.clone()))
            }
        }
    }

    pub async fn ping(&self, ctx: &RequestContext) -> CatalogResult<()> {
        match self {
            StorageBackend::Postgres(pool) => {
                ctx.within(sqlx::query("SELECT 1").execute(pool)).await.map(|_| ())
            }
            StorageBackend::Memory(store) => {
                ctx.within(async { Ok::<(), CatalogError>(store.ping().await) }).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::context::RequestContext;
    use crate::core::domain::Configuration;
    use crate::core::repository::{RepositoryStore, StorageBackend};

    #[tokio::test]
    async fn test_should_connect_memory_backend() {
        let backend = StorageBackend::connect(&Configuration::new("test", RepositoryStore::Memory))
            .await.expect("should connect");
        assert_eq!(RepositoryStore::Memory, backend.store());
        backend.ping(&RequestContext::background()).await.expect("should ping");
    }

    #[tokio::test]
    async fn test_should_deserialize_store() {
        let store: RepositoryStore = serde_json::from_str("\"memory\"").expect("should parse");
        assert_eq!(RepositoryStore::Memory, store);
        let store: RepositoryStore = serde_json::from_str("\"postgres\"").expect("should parse");
        assert_eq!(RepositoryStore::Postgres, store);
    }
}
