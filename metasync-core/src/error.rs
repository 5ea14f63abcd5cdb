//! Error types for metasync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::head::ElementId;

/// Failures raised by a [`HeadDocument`](crate::head::HeadDocument) when an
/// element can no longer be read or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeadError {
    /// The element was removed from the head after it was acquired.
    #[error("element {0} is detached from the head")]
    Detached(ElementId),

    /// No element was ever created under this id.
    #[error("no element with id {0}")]
    UnknownElement(ElementId),
}

/// All errors that can arise from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// The application origin is not an absolute http(s) origin.
    #[error("invalid application origin '{origin}'; expected http:// or https://")]
    InvalidOrigin { origin: String },
}
