use std::sync::Arc;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use crate::authors::repository::pg_author_repository::PgAuthorRepository;
use crate::core::context::RequestContext;
use crate::core::library::{CatalogError, CatalogResult};
use crate::core::repository::Repositories;
use crate::core::transaction::{TransactionCoordinator, TransactionScope};
use crate::quotes::repository::pg_quote_repository::PgQuoteRepository;
use crate::utils::pg::{PgConn, SharedTransaction};

#[derive(Debug, Clone)]
pub struct PgTransactionCoordinator {
    pool: PgPool,
}

impl PgTransactionCoordinator {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self {
            pool,
        }
    }
}

#[async_trait]
impl TransactionCoordinator for PgTransactionCoordinator {
    async fn begin(&self, ctx: &RequestContext) -> CatalogResult<Box<dyn TransactionScope>> {
        let tx = ctx.within(self.pool.begin()).await
            .map_err(|err| err.context("failed to begin transaction"))?;
        Ok(Box::new(PgTransactionScope { tx: Arc::new(Mutex::new(Some(tx))) }))
    }
}

// PgTransactionScope shares one sqlx transaction between the scoped repositories.
// sqlx rolls the transaction back when it is dropped unfinished.
struct PgTransactionScope {
    tx: SharedTransaction,
}

impl PgTransactionScope {
    async fn finish(&self) -> CatalogResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.tx.lock().await.take()
            .ok_or_else(|| CatalogError::runtime("transaction already finished", None))
    }
}

#[async_trait]
impl TransactionScope for PgTransactionScope {
    fn repositories(&self) -> Repositories {
        Repositories {
            authors: Arc::new(PgAuthorRepository::new(PgConn::Tx(self.tx.clone()))),
            quotes: Arc::new(PgQuoteRepository::new(PgConn::Tx(self.tx.clone()))),
        }
    }

    async fn commit(self: Box<Self>, ctx: &RequestContext) -> CatalogResult<()> {
        let tx = self.finish().await?;
        ctx.within(tx.commit()).await
            .map_err(|err| err.context("failed to commit transaction"))
    }

    async fn rollback(self: Box<Self>, ctx: &RequestContext) -> CatalogResult<()> {
        let tx = self.finish().await?;
        ctx.within(tx.rollback()).await
            .map_err(|err| err.context("failed to roll back transaction"))
    }
}
