use std::sync::Arc;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::domain::Configuration;
use crate::core::repository::StorageBackend;

pub fn create_catalog_service(config: &Configuration, backend: &StorageBackend) -> Arc<dyn CatalogService> {
    Arc::new(CatalogServiceImpl::new(config, backend.repositories(), backend.transaction_coordinator()))
}
