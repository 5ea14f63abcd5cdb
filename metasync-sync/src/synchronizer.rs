//! The public entry point: apply a route's metadata to the head.
//!
//! ## `update`: 3-step protocol
//!
//! 1. Resolve fallbacks for the declared metadata.
//! 2. Write every effective key through its (singleton) tag store.
//! 3. Restore the captured default of every known key the route left out.
//!
//! Each key is handled independently: a key that fails is logged and
//! reported, and the rest of the update still runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use metasync_core::{
    parse_metadata, ContentValue, HeadDocument, Metadata, MetadataKey, SyncConfig,
};

use crate::error::{head_err, serialize_display, SyncError};
use crate::fallback;
use crate::store::{Registry, TagStore};

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Outcome for one key of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WriteResult {
    /// The key's content changed.
    Written { key: MetadataKey },
    /// Every node already held the target content; nothing was mutated.
    Unchanged { key: MetadataKey },
    /// The route omitted the key and its default was written back.
    Restored { key: MetadataKey },
    /// At least one node could not be written.
    Failed {
        key: MetadataKey,
        #[serde(serialize_with = "serialize_display")]
        error: SyncError,
    },
}

impl WriteResult {
    pub fn key(&self) -> &MetadataKey {
        match self {
            WriteResult::Written { key }
            | WriteResult::Unchanged { key }
            | WriteResult::Restored { key }
            | WriteResult::Failed { key, .. } => key,
        }
    }

    /// `true` if the head was mutated for this key.
    pub fn changed(&self) -> bool {
        matches!(self, WriteResult::Written { .. } | WriteResult::Restored { .. })
    }
}

/// Outcome of one [`Synchronizer::update`] call.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub applied_at: DateTime<Utc>,
    pub results: Vec<WriteResult>,
}

impl UpdateReport {
    pub fn result(&self, key: &MetadataKey) -> Option<&WriteResult> {
        self.results.iter().find(|r| r.key() == key)
    }

    pub fn changed(&self) -> usize {
        self.results.iter().filter(|r| r.changed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &WriteResult> {
        self.results
            .iter()
            .filter(|r| matches!(r, WriteResult::Failed { .. }))
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Owns the head capability and the registry of tag stores for one page
/// session.
#[derive(Debug)]
pub struct Synchronizer<H> {
    head: H,
    config: SyncConfig,
    registry: Registry,
}

impl<H: HeadDocument> Synchronizer<H> {
    pub fn new(head: H, config: SyncConfig) -> Self {
        Self {
            head,
            config,
            registry: Registry::new(),
        }
    }

    pub fn head(&self) -> &H {
        &self.head
    }

    /// Direct access for host code that edits the head itself.
    pub fn head_mut(&mut self) -> &mut H {
        &mut self.head
    }

    pub fn into_head(self) -> H {
        self.head
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The tag store for `key`, created (and its defaults captured) on first
    /// reference.
    pub fn store(&mut self, key: &MetadataKey) -> Result<Arc<TagStore>, SyncError> {
        self.registry.get_or_create(key, &mut self.head)
    }

    /// Current content of `key`'s primary node.
    pub fn content(&mut self, key: &MetadataKey) -> Result<String, SyncError> {
        let store = self.store(key)?;
        let node = store.primary();
        node.content(&self.head)
            .map_err(|e| head_err(key, &node.spec().selector, e))
    }

    /// Converge the head on `meta`. Never fails; per-key problems are in the
    /// returned report.
    pub fn update(&mut self, meta: &Metadata) -> UpdateReport {
        let effective = fallback::resolve(meta);
        let mut results = Vec::with_capacity(effective.len());

        for (key, value) in &effective {
            let result = match self.registry.get_or_create(key, &mut self.head) {
                Ok(store) => store.apply(&mut self.head, value, &self.config),
                Err(error) => {
                    tracing::warn!("skipping {key}: {error}");
                    WriteResult::Failed {
                        key: key.clone(),
                        error,
                    }
                }
            };
            results.push(result);
        }

        let stale: Vec<Arc<TagStore>> = self
            .registry
            .stores()
            .filter(|store| !effective.contains_key(store.key()))
            .cloned()
            .collect();
        for store in stale {
            results.push(store.restore(&mut self.head));
        }

        UpdateReport {
            applied_at: Utc::now(),
            results,
        }
    }

    /// [`update`](Self::update) from the router's plain string mapping;
    /// `asset:`-prefixed values become asset references.
    pub fn update_raw<I, K, V>(&mut self, raw: I) -> UpdateReport
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.update(&parse_metadata(raw))
    }

    /// The page's own `title` and `description`, as captured before any
    /// route wrote to them. Empty values are omitted.
    pub fn default_meta(&mut self) -> Metadata {
        read_defaults(&mut self.registry, &mut self.head)
    }
}

/// [`Synchronizer::default_meta`] for a head no synchronizer has touched.
/// Needs no [`SyncConfig`]; missing elements are appended empty, as on a
/// store's first reference.
pub fn page_defaults<H>(head: &mut H) -> Metadata
where
    H: HeadDocument + ?Sized,
{
    read_defaults(&mut Registry::new(), head)
}

fn read_defaults<H>(registry: &mut Registry, head: &mut H) -> Metadata
where
    H: HeadDocument + ?Sized,
{
    let mut meta = Metadata::new();

    match registry.get_or_create(&MetadataKey::Title, head) {
        Ok(store) => {
            let title = store
                .nodes()
                .iter()
                .map(|n| n.default_content())
                .find(|c| !c.is_empty());
            if let Some(title) = title {
                meta.insert(MetadataKey::Title, ContentValue::text(title));
            }
        }
        Err(e) => tracing::warn!("cannot read default title: {e}"),
    }

    match registry.get_or_create(&MetadataKey::Description, head) {
        Ok(store) => {
            let description = store.primary().default_content();
            if !description.is_empty() {
                meta.insert(MetadataKey::Description, ContentValue::text(description));
            }
        }
        Err(e) => tracing::warn!("cannot read default description: {e}"),
    }

    meta
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
