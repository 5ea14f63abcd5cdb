//! Subcommands and the file formats they share.
//!
//! - head snapshot: JSON, `{"elements": [{"tag": "title", "text": "..."}, ...]}`
//! - routes: YAML list of `{ name, meta: { <key>: <value> } }`, where
//!   `asset:<path>` values are asset references

pub mod apply;
pub mod defaults;
pub mod diff;
pub mod init;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use metasync_core::{config, ConfigError, MemoryHead, Metadata, SyncConfig};

/// One route's declared metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub name: String,
    #[serde(default)]
    pub meta: Metadata,
}

pub fn load_head(path: &Path) -> Result<MemoryHead> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read head snapshot '{}'", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid head snapshot '{}'", path.display()))
}

pub fn load_routes(path: &Path) -> Result<Vec<Route>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read routes '{}'", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid routes file '{}'", path.display()))
}

/// `--origin` if given, otherwise `~/.metasync/config.yaml`.
pub fn resolve_config(origin: Option<&str>) -> Result<SyncConfig> {
    if let Some(origin) = origin {
        return Ok(SyncConfig::new(origin)?);
    }
    match config::load() {
        Ok(cfg) => Ok(cfg),
        Err(ConfigError::ConfigNotFound { .. }) => {
            anyhow::bail!("no application origin; pass --origin or run `metasync init`")
        }
        Err(e) => Err(e).context("failed to load ~/.metasync/config.yaml"),
    }
}
