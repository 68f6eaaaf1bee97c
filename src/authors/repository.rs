pub mod memory_author_repository;
pub mod pg_author_repository;

use async_trait::async_trait;
use crate::authors::domain::model::{AuthorEntity, AuthorParams};
use crate::core::context::RequestContext;
use crate::core::library::CatalogResult;
use crate::core::repository::{Repository, RowLock};

#[async_trait]
pub trait AuthorRepository: Repository<AuthorEntity, AuthorEntity, AuthorParams> {
    // get_locked reads an author and holds a row lock until the enclosing
    // transaction finishes. Outside a transaction it behaves like get.
    async fn get_locked(&self, ctx: &RequestContext, id: i64, lock: RowLock) -> CatalogResult<AuthorEntity>;

    // lock_name serializes writers of the same author name for the rest of the transaction.
    async fn lock_name(&self, ctx: &RequestContext, name: &str) -> CatalogResult<()>;
}
