//! Synchronizer configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.metasync/
//!   config.yaml   (app_origin, asset_prefix)
//! ```
//!
//! Like the rest of the crate, every filesystem function has an `_at(home)`
//! form used by tests and a convenience form that resolves `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Path segment between the application origin and a bundled asset.
pub const DEFAULT_ASSET_PREFIX: &str = "_/theme";

/// Host-supplied settings for resolving asset references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Absolute origin of the application, e.g. `https://shop.example.com`.
    pub app_origin: String,
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,
}

fn default_asset_prefix() -> String {
    DEFAULT_ASSET_PREFIX.to_owned()
}

impl SyncConfig {
    /// Validated config with the default asset prefix.
    pub fn new(app_origin: impl Into<String>) -> Result<Self, ConfigError> {
        Self {
            app_origin: app_origin.into(),
            asset_prefix: default_asset_prefix(),
        }
        .normalized()
    }

    /// Trim trailing `/` from the origin and surrounding `/` from the prefix,
    /// rejecting origins that are not absolute http(s) URLs.
    pub fn normalized(mut self) -> Result<Self, ConfigError> {
        let origin = self.app_origin.trim().trim_end_matches('/');
        let valid = ["http://", "https://"]
            .iter()
            .any(|scheme| origin.len() > scheme.len() && origin.starts_with(scheme));
        if !valid {
            return Err(ConfigError::InvalidOrigin {
                origin: self.app_origin,
            });
        }
        self.app_origin = origin.to_owned();
        self.asset_prefix = self.asset_prefix.trim_matches('/').to_owned();
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// `<home>/.metasync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".metasync").join("config.yaml")
}

/// Load and validate `<home>/.metasync/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent, `ConfigError::Parse`
/// (with path) if malformed.
pub fn load_at(home: &Path) -> Result<SyncConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: SyncConfig =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    config.normalized()
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<SyncConfig, ConfigError> {
    load_at(&home()?)
}

/// Atomically save the config: serialize → `config.yaml.tmp` → rename.
pub fn save_at(home: &Path, config: &SyncConfig) -> Result<(), ConfigError> {
    let path = config_path_at(home);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let tmp = path.with_file_name("config.yaml.tmp");
    std::fs::write(&tmp, serde_yaml::to_string(config)?)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &SyncConfig) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
