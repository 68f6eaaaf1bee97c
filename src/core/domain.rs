use std::time::Duration;
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use crate::core::library::{CatalogError, CatalogResult};
use crate::core::repository::RepositoryStore;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> i64;
}

// Configuration abstracts config options for the catalog service
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub environment: String,
    pub store: RepositoryStore,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_ssl_mode: String,
    pub db_max_conns: u32,
    pub db_min_conns: u32,
    pub db_max_conn_lifetime_secs: u64,
    pub db_max_conn_idle_secs: u64,
    pub db_acquire_timeout_secs: u64,
    pub db_create_schema: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl Configuration {
    pub fn new(environment: &str, store: RepositoryStore) -> Self {
        Configuration {
            environment: environment.to_string(),
            store,
            port: 8080,
            request_timeout_secs: 30,
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_user: "postgres".to_string(),
            db_password: "".to_string(),
            db_name: "quotes".to_string(),
            db_ssl_mode: "disable".to_string(),
            db_max_conns: 25,
            db_min_conns: 5,
            db_max_conn_lifetime_secs: 3600,
            db_max_conn_idle_secs: 1800,
            db_acquire_timeout_secs: 5,
            db_create_schema: true,
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    // from_env reads PORT, STORE, DB_* and LOG_* variables over the defaults above.
    pub fn from_env() -> CatalogResult<Self> {
        let defaults = Configuration::new("development", RepositoryStore::Postgres);
        let config = Config::builder()
            .set_default("environment", defaults.environment.as_str())?
            .set_default("store", "postgres")?
            .set_default("port", defaults.port as i64)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("db_host", defaults.db_host.as_str())?
            .set_default("db_port", defaults.db_port as i64)?
            .set_default("db_user", defaults.db_user.as_str())?
            .set_default("db_password", defaults.db_password.as_str())?
            .set_default("db_name", defaults.db_name.as_str())?
            .set_default("db_ssl_mode", defaults.db_ssl_mode.as_str())?
            .set_default("db_max_conns", defaults.db_max_conns as i64)?
            .set_default("db_min_conns", defaults.db_min_conns as i64)?
            .set_default("db_max_conn_lifetime_secs", defaults.db_max_conn_lifetime_secs as i64)?
            .set_default("db_max_conn_idle_secs", defaults.db_max_conn_idle_secs as i64)?
            .set_default("db_acquire_timeout_secs", defaults.db_acquire_timeout_secs as i64)?
            .set_default("db_create_schema", defaults.db_create_schema)?
            .set_default("log_level", defaults.log_level.as_str())?
            .set_default("log_json", defaults.log_json)?
            .add_source(Environment::default().try_parsing(true))
            .build()?;
        let config: Configuration = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.store == RepositoryStore::Postgres && self.db_password.is_empty() {
            return Err(CatalogError::validation("DB_PASSWORD is required for the postgres store",
                                                Some("config".to_string())));
        }
        if self.db_min_conns > self.db_max_conns {
            return Err(CatalogError::validation(
                format!("DB_MIN_CONNS {} exceeds DB_MAX_CONNS {}", self.db_min_conns, self.db_max_conns).as_str(),
                Some("config".to_string())));
        }
        Ok(())
    }

    pub fn database_url(&self) -> String {
        format!("postgres://{}:{}@{}:{}/{}?sslmode={}",
                self.db_user, self.db_password, self.db_host, self.db_port, self.db_name, self.db_ssl_mode)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
