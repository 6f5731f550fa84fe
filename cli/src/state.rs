use std::path::Path;

use backoffice::{load_or_default, Backoffice, BackofficeConfig, BackofficeError};

/// Loads configuration from `path`, or the default location when absent.
pub fn load_config(path: Option<&Path>) -> Result<BackofficeConfig, BackofficeError> {
    let config = load_or_default(path)?;
    log::debug!(
        "Loaded configuration (backend: {}, storage: {:?})",
        config.backend.kind.as_str(),
        config.storage.resolved_path()
    );
    Ok(config)
}

/// Opens the back-office with its stored session booted.
pub fn open(config: BackofficeConfig) -> Result<Backoffice, BackofficeError> {
    Backoffice::from_config(config)
}
