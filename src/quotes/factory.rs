use std::sync::Arc;
use crate::core::repository::StorageBackend;
use crate::quotes::repository::QuoteRepository;
use crate::quotes::repository::memory_quote_repository::MemoryQuoteRepository;
use crate::quotes::repository::pg_quote_repository::PgQuoteRepository;
use crate::utils::pg::PgConn;

pub(crate) fn create_quote_repository(backend: &StorageBackend) -> Arc<dyn QuoteRepository> {
    match backend {
        StorageBackend::Postgres(pool) => {
            Arc::new(PgQuoteRepository::new(PgConn::Pool(pool.clone())))
        }
        StorageBackend::Memory(store) => {
            Arc::new(MemoryQuoteRepository::new(store.shared()))
        }
    }
}
