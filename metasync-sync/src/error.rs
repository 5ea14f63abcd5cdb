//! Error types for metasync-sync.

use serde::Serializer;
use thiserror::Error;

use metasync_core::{HeadError, MetadataKey};

/// Per-key failures. [`Synchronizer::update`](crate::Synchronizer::update)
/// never returns these; they are logged and reported in
/// [`WriteResult::Failed`](crate::WriteResult::Failed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A head element for `key` could not be read or written.
    #[error("head error for '{key}' at {selector}: {source}")]
    Head {
        key: MetadataKey,
        selector: String,
        #[source]
        source: HeadError,
    },
}

/// Convenience constructor for [`SyncError::Head`].
pub(crate) fn head_err(
    key: &MetadataKey,
    selector: impl ToString,
    source: HeadError,
) -> SyncError {
    SyncError::Head {
        key: key.clone(),
        selector: selector.to_string(),
        source,
    }
}

/// Serialize an error through its `Display` form.
pub(crate) fn serialize_display<S: Serializer>(err: &SyncError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}
