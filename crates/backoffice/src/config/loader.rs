use std::path::{Path, PathBuf};

use crate::api::BackendKind;
use crate::config::schema::BackofficeConfig;
use crate::error::ConfigError;

pub const ENV_API_URL: &str = "BACKOFFICE_API_URL";
pub const ENV_BACKEND: &str = "BACKOFFICE_BACKEND";
pub const ENV_TIMEOUT_SECS: &str = "BACKOFFICE_TIMEOUT_SECS";

const MAX_PAGE_SIZE: u32 = 100;
const MAX_DEBOUNCE_MS: u64 = 10_000;
const MAX_RETRIES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// YAML for `.yaml`/`.yml`, JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

/// `<config dir>/backoffice/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("backoffice").join("config.yaml"))
}

/// Loads, applies environment overrides and validates.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BackofficeConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = load_config_from_str(&content, ConfigFormat::from_path(path))?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn load_config_from_str(
    content: &str,
    format: ConfigFormat,
) -> Result<BackofficeConfig, ConfigError> {
    let mut config: BackofficeConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml if content.trim().is_empty() => BackofficeConfig::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Explicit path if given, else the default path if it exists, else
/// defaults. Environment overrides apply in every case.
pub fn load_or_default(path: Option<&Path>) -> Result<BackofficeConfig, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }
    if let Some(path) = default_config_path().filter(|p| p.is_file()) {
        return load_config(path);
    }

    let mut config = BackofficeConfig::default();
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn apply_env_overrides(config: &mut BackofficeConfig) -> Result<(), ConfigError> {
    if let Some(url) = env_value(ENV_API_URL) {
        config.backend.api_url = url;
    }

    if let Some(raw) = env_value(ENV_BACKEND) {
        config.backend.kind = BackendKind::parse(&raw).ok_or_else(|| ConfigError::InvalidEnv {
            name: ENV_BACKEND.to_string(),
            value: raw.clone(),
        })?;
    }

    if let Some(raw) = env_value(ENV_TIMEOUT_SECS) {
        config.backend.timeout_secs = raw
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| ConfigError::InvalidEnv {
                name: ENV_TIMEOUT_SECS.to_string(),
                value: raw.clone(),
            })?;
    }

    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_config(config: &BackofficeConfig) -> Result<(), ConfigError> {
    let invalid = |message: String| Err(ConfigError::Validation { message });

    if config.backend.kind == BackendKind::Remote {
        let url = config.backend.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return invalid(format!(
                "backend.api_url must be an http(s) URL, got '{}'",
                url
            ));
        }
    }

    if config.backend.timeout_secs == 0 {
        return invalid("backend.timeout_secs must be greater than zero".to_string());
    }

    if !(1..=MAX_PAGE_SIZE).contains(&config.list.page_size) {
        return invalid(format!(
            "list.page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        ));
    }

    if config.list.debounce_ms > MAX_DEBOUNCE_MS {
        return invalid(format!(
            "list.debounce_ms must be at most {}",
            MAX_DEBOUNCE_MS
        ));
    }

    if config.cache.retries > MAX_RETRIES {
        return invalid(format!("cache.retries must be at most {}", MAX_RETRIES));
    }

    if config.cache.max_entries == 0 {
        return invalid("cache.max_entries must be greater than zero".to_string());
    }

    Ok(())
}
