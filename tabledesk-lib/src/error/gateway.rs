//! Gateway error types

use std::time::Duration;

/// Errors that can occur while talking to the remote collection store.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP error response from the store.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message, taken from the error body when the store sends one.
        message: String,
        /// Store-specific error code, if available.
        code: Option<String>,
    },

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header value (API key or token) contains characters HTTP does not allow.
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// Failed to parse the store's response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// The table does not exist in the store.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// No row with the given id exists.
    #[error("Row {id} not found in {table}")]
    NotFound {
        /// Table that was searched.
        table: String,
        /// Id that was not found.
        id: String,
    },

    /// The store refused the operation.
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl GatewayError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Creates a new not-found error.
    pub fn not_found(table: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            table: table.into(),
            id: id.to_string(),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the store error code if available.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
