pub mod memory_transaction;
pub mod pg_transaction;

use async_trait::async_trait;
use futures::future::BoxFuture;
use crate::core::context::RequestContext;
use crate::core::library::CatalogResult;
use crate::core::repository::Repositories;

// TransactionCoordinator opens atomic scopes spanning the author and quote repositories.
#[async_trait]
pub trait TransactionCoordinator: Sync + Send {
    async fn begin(&self, ctx: &RequestContext) -> CatalogResult<Box<dyn TransactionScope>>;
}

// TransactionScope is an open transaction. Dropping it without commit rolls it back.
#[async_trait]
pub trait TransactionScope: Send {
    // repositories bound to this scope
    fn repositories(&self) -> Repositories;

    async fn commit(self: Box<Self>, ctx: &RequestContext) -> CatalogResult<()>;

    async fn rollback(self: Box<Self>, ctx: &RequestContext) -> CatalogResult<()>;
}

// with_transaction runs work inside one scope: commit on Ok, rollback on Err. A
// panic or a cancelled caller drops the scope, which rolls back as well.
pub async fn with_transaction<'a, T, F>(coordinator: &dyn TransactionCoordinator,
                                        ctx: &RequestContext, work: F) -> CatalogResult<T>
    where F: FnOnce(Repositories) -> BoxFuture<'a, CatalogResult<T>> + Send, T: Send {
    let scope = coordinator.begin(ctx).await?;
    match work(scope.repositories()).await {
        Ok(val) => {
            scope.commit(ctx).await?;
            Ok(val)
        }
        Err(err) => {
            if let Err(rollback_err) = scope.rollback(ctx).await {
                tracing::warn!(request_id = ctx.request_id.as_str(), error = %rollback_err,
                    "failed to roll back transaction");
            }
            Err(err)
        }
    }
}
