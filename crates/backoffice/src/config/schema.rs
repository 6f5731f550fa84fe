use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::api::BackendKind;
use crate::logging::LogFormat;
use crate::query::CacheConfig;
use crate::secrets::{resolve_secret_optional, SecretError};

/// Password accepted by the local backend when none is configured.
pub const DEFAULT_DEMO_PASSWORD: &str = "demo1234";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackofficeConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub list: ListSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Whole-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: None,
        }
    }
}

/// Settings for the storage-backed mock backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub demo_password: Option<String>,
    #[serde(default)]
    pub demo_password_file: Option<String>,
    #[serde(default)]
    pub demo_password_env_var: Option<String>,
    /// Write a demo admin and sample postings into an empty store.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            demo_password: None,
            demo_password_file: None,
            demo_password_env_var: None,
            seed_demo_data: true,
        }
    }
}

impl LocalConfig {
    /// The configured demo password, or [`DEFAULT_DEMO_PASSWORD`].
    pub fn demo_password(&self) -> Result<SecretString, SecretError> {
        let resolved = resolve_secret_optional(
            self.demo_password.as_deref(),
            self.demo_password_file.as_deref(),
            self.demo_password_env_var.as_deref(),
        )?;
        Ok(resolved.unwrap_or_else(|| {
            log::warn!("No demo password configured, using the built-in default");
            SecretString::from(DEFAULT_DEMO_PASSWORD.to_string())
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file for the session and the local backend. Defaults to the
    /// platform data directory.
    #[serde(default)]
    pub path: Option<String>,
}

impl StorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        match self.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) if p == "~" || p.starts_with("~/") => dirs::home_dir()
                .map(|home| home.join(p.trim_start_matches('~').trim_start_matches('/')))
                .unwrap_or_else(|| PathBuf::from(p)),
            Some(p) => PathBuf::from(p),
            None => crate::db::default_database_path()
                .unwrap_or_else(|| PathBuf::from("backoffice.db")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_stale_secs")]
    pub stale_time_secs: u64,
    #[serde(default = "default_idle_secs")]
    pub idle_time_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_stale_secs() -> u64 {
    30
}

fn default_idle_secs() -> u64 {
    300
}

fn default_max_entries() -> u64 {
    500
}

fn default_retries() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            stale_time_secs: default_stale_secs(),
            idle_time_secs: default_idle_secs(),
            max_entries: default_max_entries(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            stale_time: Duration::from_secs(self.stale_time_secs),
            idle_time: Duration::from_secs(self.idle_time_secs),
            max_entries: self.max_entries,
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Quiet period before a typed filter is applied.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_page_size() -> u32 {
    crate::models::params::DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    400
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ListSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl BackofficeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.backend.connect_timeout_secs.map(Duration::from_secs)
    }
}
