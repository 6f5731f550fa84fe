use std::path::PathBuf;
use thiserror::Error;

pub use crate::api::error::ApiError;
pub use crate::db::DatabaseError;
pub use crate::forms::FieldErrors;
pub use crate::logging::LoggingError;
pub use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum BackofficeError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authentication error: {0}")]
    Auth(#[from] SessionError),

    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

impl BackofficeError {
    /// Message suitable for a toast or an inline error region.
    pub fn user_message(&self) -> String {
        match self {
            BackofficeError::Api(e) => e.user_message(),
            BackofficeError::Auth(e) => e.user_message(),
            BackofficeError::Validation(errors) => errors.summary(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid value '{value}' for environment variable '{name}'")]
    InvalidEnv { name: String, value: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid login form: {0}")]
    InvalidForm(FieldErrors),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Session storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Login response did not include a token")]
    MissingToken,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::InvalidForm(errors) => errors.summary(),
            SessionError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackofficeError>;
