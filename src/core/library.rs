use std::cmp;
use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;
pub const DEFAULT_OFFSET: i64 = 0;

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    // Raised for business-rule collisions: duplicate author names, deleting an
    // author that still has quotes, and storage-level unique/FK violations.
    Conflict {
        message: String,
        reason_code: Option<String>,
    },
    NotFound {
        message: String,
    },
    // This is a retry-able error, which indicates that the storage engine could not
    // be reached before the request deadline or the pool had no free connection.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl CatalogError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> CatalogError {
        CatalogError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn conflict(message: &str, reason_code: Option<String>) -> CatalogError {
        CatalogError::Conflict { message: message.to_string(), reason_code }
    }

    pub fn not_found(message: &str) -> CatalogError {
        CatalogError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> CatalogError {
        CatalogError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> CatalogError {
        CatalogError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> CatalogError {
        CatalogError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> CatalogError {
        CatalogError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn message(&self) -> &str {
        match self {
            CatalogError::Database { message, .. } => { message }
            CatalogError::Conflict { message, .. } => { message }
            CatalogError::NotFound { message } => { message }
            CatalogError::CurrentlyUnavailable { message, .. } => { message }
            CatalogError::Validation { message, .. } => { message }
            CatalogError::Serialization { message } => { message }
            CatalogError::Runtime { message, .. } => { message }
        }
    }

    // context prefixes the message with the failing operation and keeps the kind.
    pub fn context(self, operation: &str) -> CatalogError {
        let wrap = |message: String| format!("{}: {}", operation, message);
        match self {
            CatalogError::Database { message, reason_code, retryable } => {
                CatalogError::Database { message: wrap(message), reason_code, retryable }
            }
            CatalogError::Conflict { message, reason_code } => {
                CatalogError::Conflict { message: wrap(message), reason_code }
            }
            CatalogError::NotFound { message } => {
                CatalogError::NotFound { message: wrap(message) }
            }
            CatalogError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CatalogError::CurrentlyUnavailable { message: wrap(message), reason_code, retryable }
            }
            CatalogError::Validation { message, reason_code } => {
                CatalogError::Validation { message: wrap(message), reason_code }
            }
            CatalogError::Serialization { message } => {
                CatalogError::Serialization { message: wrap(message) }
            }
            CatalogError::Runtime { message, reason_code } => {
                CatalogError::Runtime { message: wrap(message), reason_code }
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CatalogError::Conflict { .. })
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::runtime(
            format!("io error {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::validation(
            format!("invalid configuration {}", err).as_str(), Some("config".to_string()))
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            CatalogError::Conflict { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            CatalogError::NotFound { message } => {
                write!(f, "{}", message)
            }
            CatalogError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            CatalogError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            CatalogError::Serialization { message } => {
                write!(f, "{}", message)
            }
            CatalogError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// A specialized Result type for the catalog.
pub type CatalogResult<T> = Result<T, CatalogError>;

// ListParams is the limit/offset cursor shared by every list and search operation
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
}

impl ListParams {
    // new clamps over-limit requests to MAX_LIMIT and falls back to defaults
    // for anything out of range.
    pub fn new(limit: i64, offset: i64) -> Self {
        let limit = if limit > 0 { cmp::min(limit, MAX_LIMIT) } else { DEFAULT_LIMIT };
        let offset = if offset >= 0 { offset } else { DEFAULT_OFFSET };
        ListParams { limit, offset }
    }

    // parse reads raw query-string values; non-numeric input is silently ignored.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit.and_then(|l| l.trim().parse::<i64>().ok()).unwrap_or(DEFAULT_LIMIT);
        let offset = offset.and_then(|o| o.trim().parse::<i64>().ok()).unwrap_or(DEFAULT_OFFSET);
        ListParams::new(limit, offset)
    }

    pub fn first() -> Self {
        ListParams::new(1, 0)
    }
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams { limit: DEFAULT_LIMIT, offset: DEFAULT_OFFSET }
    }
}

// It defines abstraction for paginated result
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResult<T> {
    // total number of matching records, ignoring pagination
    pub total: i64,
    // effective page size
    pub limit: i64,
    // effective start position
    pub offset: i64,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub fn new(params: &ListParams, total: i64, records: Vec<T>) -> Self {
        PaginatedResult {
            total,
            limit: params.limit,
            offset: params.offset,
            records,
        }
    }
}
