use std::sync::Arc;
use crate::authors::repository::AuthorRepository;
use crate::authors::repository::memory_author_repository::MemoryAuthorRepository;
use crate::authors::repository::pg_author_repository::PgAuthorRepository;
use crate::core::repository::StorageBackend;
use crate::utils::pg::PgConn;

pub(crate) fn create_author_repository(backend: &StorageBackend) -> Arc<dyn AuthorRepository> {
    match backend {
        StorageBackend::Postgres(pool) => {
            Arc::new(PgAuthorRepository::new(PgConn::Pool(pool.clone())))
        }
        StorageBackend::Memory(store) => {
            Arc::new(MemoryAuthorRepository::new(store.shared()))
        }
    }
}
