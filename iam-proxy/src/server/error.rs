use crate::common::Operation;
use crate::iam::IamError;
use thiserror::Error;

/// Errors that can occur while handling a proxy request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// Caller mistake; no IAM call was attempted
    #[error("{message}")]
    Validation { message: String },

    /// IAM rejected or failed a call
    #[error("AWS error: {message}")]
    Remote {
        code: Option<String>,
        message: String,
    },

    #[error("Error: {message}")]
    Unexpected { message: String },
}

impl ProxyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn missing_operation() -> Self {
        Self::validation("Missing required parameter: operation")
    }

    pub fn missing_username(operation: Operation) -> Self {
        Self::validation(format!("{} requires username parameter", operation))
    }

    pub fn invalid_username() -> Self {
        Self::validation(
            "Invalid username format. Must contain only alphanumeric characters and +=,.@_-",
        )
    }

    pub fn unknown_operation(operation: &str) -> Self {
        Self::validation(format!("Unknown operation: {}", operation))
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// HTTP status code reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Remote { .. } | Self::Unexpected { .. } => 500,
        }
    }
}

impl From<IamError> for ProxyError {
    fn from(error: IamError) -> Self {
        match error {
            IamError::Service { code, message, .. } => Self::Remote { code, message },
            other => Self::unexpected(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(error: serde_json::Error) -> Self {
        Self::unexpected(error.to_string())
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
