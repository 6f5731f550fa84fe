//! Resource client error types.

use thiserror::Error;

/// Shown when a request exceeds the configured timeout.
pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again.";

/// Shown when the server cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the server. Please check your connection.";

/// Errors produced by backend calls.
///
/// Every variant renders a human-readable message; callers surface
/// [`ApiError::user_message`] without inspecting the variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request did not complete within the timeout.
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,

    /// Connection refused, DNS failure or similar connectivity problem.
    #[error("{}", UNREACHABLE_MESSAGE)]
    Unreachable(String),

    /// Non-2xx HTTP response.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx response whose envelope reported a failure.
    #[error("{message}")]
    Application { message: String },

    /// The referenced record does not exist.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Credentials were rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// The request was rejected before it was sent.
    #[error("{0}")]
    InvalidRequest(String),

    /// The response body could not be decoded.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// The local backend failed to read or write its store.
    #[error("Local storage failure: {0}")]
    Storage(String),
}

impl ApiError {
    /// Builds an HTTP error, deriving the message from the status code when
    /// the body carried none.
    pub fn from_status(status: u16, body_message: Option<String>) -> Self {
        let message = body_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status_message(status));
        ApiError::Http { status, message }
    }

    /// Application-level failure with a fallback when the envelope message is empty.
    pub fn application(message: Option<String>, fallback: &str) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        ApiError::Application { message }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::Http { status: 401, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. } | ApiError::Http { status: 404, .. })
    }

    /// Whether a cache retry has any chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Timeout | ApiError::Unreachable(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() || err.is_request() {
            ApiError::Unreachable(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), None)
        } else {
            ApiError::Unreachable(err.to_string())
        }
    }
}

impl From<crate::error::StorageError> for ApiError {
    fn from(err: crate::error::StorageError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

/// Message for an HTTP status when the body carries no usable text.
pub fn status_message(status: u16) -> String {
    match status {
        400 => "The request was invalid.".to_string(),
        401 => "Your session has expired. Please log in again.".to_string(),
        403 => "You do not have permission to perform this action.".to_string(),
        404 => "The requested resource was not found.".to_string(),
        409 => "The resource was modified by someone else.".to_string(),
        413 => "The uploaded file is too large.".to_string(),
        422 => "The submitted data could not be processed.".to_string(),
        429 => "Too many requests. Please slow down.".to_string(),
        500..=599 => "The server encountered an error. Please try again later.".to_string(),
        other => format!("Request failed with status {}", other),
    }
}

/// Result type for backend calls.
pub type Result<T> = std::result::Result<T, ApiError>;
