pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod forms;
pub mod logging;
pub mod models;
pub mod query;
pub mod resources;
pub mod sanitize;
pub mod secrets;
pub mod storage;
pub mod view;

pub use api::{ApiError, Backend, BackendKind, LocalBackend, RemoteBackend};
pub use app::Backoffice;
pub use auth::{AuthSession, BearerToken, Credentials, GateDecision, RouteGate, SessionState};
pub use config::{load_config, load_or_default, BackofficeConfig};
pub use controller::{ListController, DEFAULT_DEBOUNCE};
pub use error::{BackofficeError, ConfigError, Result, SessionError, StorageError};
pub use forms::FieldErrors;
pub use models::{PaginationEnvelope, QueryParams};
pub use query::{QueryClient, QueryKey, Resource};
pub use resources::Resources;
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
