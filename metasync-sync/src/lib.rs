//! # metasync-sync
//!
//! Keeps the document head's title, description and Open Graph tags in step
//! with the active route.
//!
//! Call [`Synchronizer::update`] with each route's [`Metadata`]; keys the route
//! does not declare are restored to the content the head had before the
//! synchronizer first touched them.
//!
//! [`Metadata`]: metasync_core::Metadata

pub mod diff;
pub mod error;
pub mod fallback;
pub mod node;
pub mod pending;
pub mod store;
pub mod synchronizer;

pub use error::SyncError;
pub use node::{Access, NodeHandle, NodeSpec, Transform};
pub use pending::{LatestOnly, SharedSynchronizer};
pub use store::{Registry, TagStore};
pub use synchronizer::{page_defaults, Synchronizer, UpdateReport, WriteResult};
