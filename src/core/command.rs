use async_trait::async_trait;
use crate::core::context::RequestContext;
use crate::core::library::CatalogError;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    Conflict {
        message: String,
        reason_code: Option<String>,
    },
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    NotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
}

impl CommandError {
    pub fn validation(message: &str) -> CommandError {
        CommandError::Validation { message: message.to_string(), reason_code: None }
    }

    pub fn message(&self) -> &str {
        match self {
            CommandError::Conflict { message, .. } => { message }
            CommandError::Database { message, .. } => { message }
            CommandError::NotFound { message } => { message }
            CommandError::Runtime { message, .. } => { message }
            CommandError::Serialization { message } => { message }
            CommandError::Validation { message, .. } => { message }
        }
    }
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, ctx: &RequestContext, req: Request) -> Result<Response, CommandError>;
}

// check_length validates the character count of a required request field.
pub(crate) fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), CommandError> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(CommandError::validation(format!("{} is required", field).as_str()));
    }
    if len > max {
        return Err(CommandError::validation(
            format!("{} must be at most {} characters", field, max).as_str()));
    }
    Ok(())
}

impl From<CatalogError> for CommandError {
    fn from(other: CatalogError) -> Self {
        match other {
            CatalogError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            CatalogError::Conflict { message, reason_code } => {
                CommandError::Conflict { message, reason_code }
            }
            CatalogError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            CatalogError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Runtime { message, reason_code, retryable }
            }
            CatalogError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            CatalogError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            CatalogError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: false }
            }
        }
    }
}
