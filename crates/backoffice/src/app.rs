//! Wiring from configuration to a ready-to-use back-office client.

use std::sync::Arc;

use crate::api::{Backend, BackendKind, LocalBackend, RemoteBackend};
use crate::auth::{AuthSession, Credentials, RouteGate};
use crate::config::BackofficeConfig;
use crate::controller::ListController;
use crate::db::Database;
use crate::error::Result;
use crate::models::params::PAGE_SIZE_KEY;
use crate::models::{ListStatus, QueryParams};
use crate::query::QueryClient;
use crate::resources::Resources;
use crate::storage::{KeyValueStore, SqliteStore};

/// Store namespace for the signed-in session.
pub const SESSION_NAMESPACE: &str = "session";
/// Store namespace for the local backend's records.
pub const LOCAL_NAMESPACE: &str = "local";

/// Backend, cache, resources and session built from one configuration.
pub struct Backoffice {
    config: BackofficeConfig,
    backend: Arc<dyn Backend>,
    resources: Resources,
    session: AuthSession,
    gate: RouteGate,
}

impl Backoffice {
    /// Opens the configured SQLite file and boots the session from it.
    pub fn from_config(config: BackofficeConfig) -> Result<Self> {
        let path = config.storage.resolved_path();
        let db = Database::open(&path).map_err(crate::error::StorageError::from)?;
        Self::with_database(config, db)
    }

    pub fn with_database(config: BackofficeConfig, db: Database) -> Result<Self> {
        let credentials = Credentials::new();
        let backend: Arc<dyn Backend> = match config.backend.kind {
            BackendKind::Remote => {
                let mut builder = RemoteBackend::builder()
                    .base_url(config.backend.api_url.clone())
                    .timeout(config.timeout())
                    .credentials(credentials.clone());
                if let Some(connect) = config.connect_timeout() {
                    builder = builder.connect_timeout(connect);
                }
                Arc::new(builder.build()?)
            }
            BackendKind::Local => {
                let store: Arc<dyn KeyValueStore> =
                    Arc::new(SqliteStore::new(db.clone(), LOCAL_NAMESPACE));
                let local =
                    LocalBackend::new(store, config.local.demo_password()?, credentials.clone());
                if config.local.seed_demo_data {
                    local.seed_demo_data()?;
                }
                Arc::new(local)
            }
        };
        log::debug!("Using {} backend", backend.kind().as_str());

        let cache = QueryClient::new(config.cache.to_cache_config());
        let resources = Resources::new(backend.clone(), cache.clone());

        let session_store: Arc<dyn KeyValueStore> =
            Arc::new(SqliteStore::new(db, SESSION_NAMESPACE));
        let mut session =
            AuthSession::new(session_store, backend.clone(), credentials).with_cache(cache);
        session.boot()?;

        Ok(Self {
            config,
            backend,
            resources,
            session,
            gate: RouteGate::default(),
        })
    }

    pub fn config(&self) -> &BackofficeConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AuthSession {
        &mut self.session
    }

    pub fn gate(&self) -> &RouteGate {
        &self.gate
    }

    /// A list controller restored from a URL query string, using the
    /// configured debounce and, unless the query names one, page size.
    pub fn list_controller<T, S: ListStatus>(
        &self,
        filter_keys: &'static [&'static str],
        query: &str,
    ) -> ListController<T, S> {
        let controller = ListController::from_query_string(
            query,
            filter_keys,
            self.config.list.debounce(),
        );
        if QueryParams::parse_query_string(query).contains_key(PAGE_SIZE_KEY) {
            controller
        } else {
            controller.page_size_default(self.config.list.page_size)
        }
    }
}

impl std::fmt::Debug for Backoffice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backoffice")
            .field("backend", &self.backend.kind())
            .field("session", &self.session)
            .finish()
    }
}
