use std::sync::Arc;
use std::time::Duration;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use crate::core::domain::Configuration;
use crate::core::library::{CatalogError, CatalogResult};

pub(crate) type SharedTransaction = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

const CREATE_AUTHORS_TABLE: &str = "CREATE TABLE IF NOT EXISTS authors (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    bio TEXT,
    created_at TIMESTAMP NOT NULL DEFAULT (now() AT TIME ZONE 'utc'),
    updated_at TIMESTAMP NOT NULL DEFAULT (now() AT TIME ZONE 'utc')
)";

const CREATE_QUOTES_TABLE: &str = "CREATE TABLE IF NOT EXISTS quotes (
    id BIGSERIAL PRIMARY KEY,
    content TEXT NOT NULL,
    author_id BIGINT NOT NULL REFERENCES authors(id) ON DELETE RESTRICT,
    source TEXT,
    tags TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMP NOT NULL DEFAULT (now() AT TIME ZONE 'utc'),
    updated_at TIMESTAMP NOT NULL DEFAULT (now() AT TIME ZONE 'utc')
)";

const CREATE_QUOTES_AUTHOR_INDEX: &str = "CREATE INDEX IF NOT EXISTS quotes_author_id_ndx ON quotes (author_id)";

// PgConn is where a postgres repository sends its statements: straight to the
// pool, or to a transaction opened by the coordinator.
#[derive(Debug, Clone)]
pub(crate) enum PgConn {
    Pool(PgPool),
    Tx(SharedTransaction),
}

// Runs a sqlx query or query_as against a PgConn with the given fetch method.
macro_rules! run_on {
    ($conn:expr, $query:expr, $method:ident) => {
        match $conn {
            crate::utils::pg::PgConn::Pool(pool) => $query.$method(pool).await,
            crate::utils::pg::PgConn::Tx(tx) => {
                let mut guard = tx.lock().await;
                match guard.as_mut() {
                    Some(tx) => $query.$method(&mut **tx).await,
                    None => Err(sqlx::Error::Protocol("transaction already finished".to_string())),
                }
            }
        }
    };
}

pub(crate) use run_on;

pub(crate) async fn build_db_pool(config: &Configuration) -> CatalogResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_conns)
        .min_connections(config.db_min_conns)
        .max_lifetime(Duration::from_secs(config.db_max_conn_lifetime_secs))
        .idle_timeout(Duration::from_secs(config.db_max_conn_idle_secs))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect(config.database_url().as_str())
        .await
        .map_err(|err| CatalogError::from(err).context(
            format!("failed to connect to {}:{}/{}", config.db_host, config.db_port, config.db_name).as_str()))?;
    tracing::info!(max = config.db_max_conns, min = config.db_min_conns, "database connection pool created");
    Ok(pool)
}

pub(crate) async fn create_tables(pool: &PgPool) -> CatalogResult<()> {
    for statement in [CREATE_AUTHORS_TABLE, CREATE_QUOTES_TABLE, CREATE_QUOTES_AUTHOR_INDEX] {
        sqlx::query(statement).execute(pool).await
            .map_err(|err| CatalogError::from(err).context("failed to create tables"))?;
    }
    Ok(())
}

// connect_test_pool reads DB_* from the environment and makes sure the schema exists.
#[cfg(test)]
pub(crate) async fn connect_test_pool() -> PgPool {
    let config = Configuration::from_env().expect("should load configuration");
    let pool = build_db_pool(&config).await.expect("should connect to postgres");
    create_tables(&pool).await.expect("should create tables");
    pool
}

// like_pattern escapes LIKE wildcards so the query matches as a literal substring.
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return matches!(db_err.kind(), ErrorKind::ForeignKeyViolation);
    }
    false
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                CatalogError::not_found("row not found")
            }
            sqlx::Error::Database(ref db_err) => {
                let reason = db_err.code().map(|c| c.to_string());
                match db_err.kind() {
                    ErrorKind::UniqueViolation => {
                        CatalogError::conflict(format!("unique violation {}", db_err).as_str(), reason)
                    }
                    ErrorKind::ForeignKeyViolation => {
                        CatalogError::conflict(format!("foreign key violation {}", db_err).as_str(), reason)
                    }
                    _ => {
                        CatalogError::database(format!("postgres error {}", db_err).as_str(), reason, false)
                    }
                }
            }
            sqlx::Error::PoolTimedOut => {
                CatalogError::unavailable("postgres pool timed out", Some("PoolTimedOut".to_string()), true)
            }
            sqlx::Error::PoolClosed => {
                CatalogError::unavailable("postgres pool closed", Some("PoolClosed".to_string()), false)
            }
            sqlx::Error::Io(ref io_err) => {
                CatalogError::unavailable(format!("postgres io error {}", io_err).as_str(), Some("Io".to_string()), true)
            }
            sqlx::Error::Tls(ref tls_err) => {
                CatalogError::unavailable(format!("postgres tls error {}", tls_err).as_str(), Some("Tls".to_string()), false)
            }
            other => {
                CatalogError::database(format!("postgres error {:?}", other).as_str(), None, false)
            }
        }
    }
}
