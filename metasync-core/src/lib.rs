//! Metasync core library: metadata types, the head-document capability,
//! configuration, errors.
//!
//! Public API surface:
//! - [`types`]: metadata keys, content values, the [`Metadata`] mapping
//! - [`head`]: [`HeadDocument`] capability and the in-memory [`MemoryHead`]
//! - [`config`]: [`SyncConfig`] load / save
//! - [`error`]: [`HeadError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod head;
pub mod types;

pub use config::SyncConfig;
pub use error::{ConfigError, HeadError};
pub use head::{Element, ElementId, HeadDocument, MemoryHead, MetaAttr, Selector};
pub use types::{parse_metadata, ContentValue, Metadata, MetadataKey};
