pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, default_config_path, load_config, load_config_from_str, load_or_default,
    ConfigFormat,
};
pub use schema::{
    BackendConfig, BackofficeConfig, CacheSettings, ListSettings, LocalConfig, LoggingConfig,
    StorageConfig, DEFAULT_DEMO_PASSWORD,
};
