use std::sync::Arc;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogService;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;
use crate::core::library::PaginatedResult;
use crate::core::repository::StorageBackend;

#[derive(Clone)]
pub struct AppState {
    pub config: Configuration,
    pub service: Arc<dyn CatalogService>,
    pub backend: StorageBackend,
}

impl AppState {
    pub fn new(config: &Configuration, service: Arc<dyn CatalogService>, backend: StorageBackend) -> AppState {
        AppState {
            config: config.clone(),
            service,
            backend,
        }
    }
}

// ServerError is the `{error, message, code}` reply of a failed request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub code: String,
}

impl ServerError {
    pub fn new(status: StatusCode, code: &str, message: &str) -> ServerError {
        let err = ServerError {
            status,
            code: code.to_string(),
            message: message.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code, detail = message, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), code, detail = message, "request rejected");
        }
        err
    }

    // from_command derives the code from the failing operation, e.g. DELETE_AUTHOR_CONFLICT.
    pub fn from_command(operation: &str, err: CommandError) -> ServerError {
        match err {
            CommandError::NotFound { .. } => {
                ServerError::new(StatusCode::NOT_FOUND, format!("{}_NOT_FOUND", operation).as_str(), err.message())
            }
            CommandError::Conflict { .. } => {
                ServerError::new(StatusCode::BAD_REQUEST, format!("{}_CONFLICT", operation).as_str(), err.message())
            }
            CommandError::Validation { .. } => {
                ServerError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.message())
            }
            CommandError::Serialization { .. } => {
                ServerError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST_BODY", err.message())
            }
            CommandError::Database { .. } | CommandError::Runtime { .. } => {
                ServerError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{}_ERROR", operation).as_str(), err.message())
            }
        }
    }

    pub fn invalid_id(raw: &str) -> ServerError {
        ServerError::new(StatusCode::BAD_REQUEST, "INVALID_ID", format!("invalid id {:?}", raw).as_str())
    }

    pub fn invalid_author_id(raw: &str) -> ServerError {
        ServerError::new(StatusCode::BAD_REQUEST, "INVALID_AUTHOR_ID", format!("invalid author_id {:?}", raw).as_str())
    }
}

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    ServerError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST_BODY", format!("{}", err).as_str())
}

pub fn rejection_to_server_error(rejection: JsonRejection) -> ServerError {
    ServerError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST_BODY", rejection.body_text().as_str())
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

// PageBody is the `{data, meta}` envelope for list and search replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBody<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> From<PaginatedResult<T>> for PageBody<T> {
    fn from(other: PaginatedResult<T>) -> Self {
        PageBody {
            meta: PageMeta { total: other.total, limit: other.limit, offset: other.offset },
            data: other.records,
        }
    }
}
