//! Tag stores and the per-page registry.
//!
//! A [`TagStore`] groups the nodes that together carry one metadata key
//! (`title` drives both `<title>` and `meta[name="title"]`). The
//! [`Registry`] hands out exactly one store per key for the page's lifetime.

use std::collections::BTreeMap;
use std::sync::Arc;

use metasync_core::{ContentValue, HeadDocument, MetadataKey, Selector, SyncConfig};

use crate::error::{head_err, SyncError};
use crate::node::{NodeHandle, NodeSpec, Transform};
use crate::synchronizer::WriteResult;

/// Node layout for `key`. Unknown keys map to a single `meta[name=key]`.
pub fn node_specs(key: &MetadataKey) -> Vec<NodeSpec> {
    match key {
        MetadataKey::Title => vec![
            NodeSpec::title_text(),
            NodeSpec::meta_content(Selector::meta_name("title")),
        ],
        MetadataKey::Description => vec![NodeSpec::meta_content(Selector::meta_name(
            "description",
        ))],
        MetadataKey::OgTitle | MetadataKey::OgDescription => {
            vec![NodeSpec::meta_content(Selector::open_graph(key.as_str()))]
        }
        MetadataKey::OgImage => vec![NodeSpec::meta_content(Selector::open_graph(key.as_str()))
            .with_transform(Transform::AssetUrl)],
        MetadataKey::Other(name) => vec![NodeSpec::meta_content(Selector::meta_name(name.as_str()))],
    }
}

// ---------------------------------------------------------------------------
// TagStore
// ---------------------------------------------------------------------------

/// The nodes behind one metadata key, always written together.
#[derive(Debug, PartialEq, Eq)]
pub struct TagStore {
    key: MetadataKey,
    nodes: Vec<NodeHandle>,
}

impl TagStore {
    /// Acquire (or create) every node for `key`, capturing their defaults.
    fn acquire<H>(key: &MetadataKey, head: &mut H) -> Result<Self, SyncError>
    where
        H: HeadDocument + ?Sized,
    {
        let nodes = node_specs(key)
            .into_iter()
            .map(|spec| {
                let selector = spec.selector.clone();
                NodeHandle::get_or_create(head, spec).map_err(|e| head_err(key, selector, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            key: key.clone(),
            nodes,
        })
    }

    pub fn key(&self) -> &MetadataKey {
        &self.key
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    /// The primary node (`<title>` for `title`).
    pub fn primary(&self) -> &NodeHandle {
        &self.nodes[0]
    }

    /// Write `value` to every node. A node that fails is logged and skipped;
    /// the remaining nodes are still written.
    pub fn apply<H>(&self, head: &mut H, value: &ContentValue, config: &SyncConfig) -> WriteResult
    where
        H: HeadDocument + ?Sized,
    {
        let outcome = self.each_node(|node| node.set_content(head, value, config));
        match outcome {
            Err(error) => WriteResult::Failed {
                key: self.key.clone(),
                error,
            },
            Ok(true) => {
                tracing::info!("wrote: {} = {value}", self.key);
                WriteResult::Written {
                    key: self.key.clone(),
                }
            }
            Ok(false) => {
                tracing::debug!("unchanged: {}", self.key);
                WriteResult::Unchanged {
                    key: self.key.clone(),
                }
            }
        }
    }

    /// Write every node's captured default back.
    pub fn restore<H>(&self, head: &mut H) -> WriteResult
    where
        H: HeadDocument + ?Sized,
    {
        match self.each_node(|node| node.reset(head)) {
            Err(error) => WriteResult::Failed {
                key: self.key.clone(),
                error,
            },
            Ok(true) => {
                tracing::info!("restored default: {}", self.key);
                WriteResult::Restored {
                    key: self.key.clone(),
                }
            }
            Ok(false) => WriteResult::Unchanged {
                key: self.key.clone(),
            },
        }
    }

    /// Run `op` on every node; `Ok(changed)` if all succeeded, otherwise the
    /// first failure.
    fn each_node<F>(&self, mut op: F) -> Result<bool, SyncError>
    where
        F: FnMut(&NodeHandle) -> Result<bool, metasync_core::HeadError>,
    {
        let mut changed = false;
        let mut first_error = None;
        for node in &self.nodes {
            match op(node) {
                Ok(c) => changed |= c,
                Err(e) => {
                    tracing::warn!(
                        "failed to write {} ({}): {e}",
                        self.key,
                        node.spec().selector
                    );
                    first_error.get_or_insert_with(|| head_err(&self.key, &node.spec().selector, e));
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(changed),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Singleton [`TagStore`] per key, kept for the lifetime of the page.
#[derive(Debug, Default)]
pub struct Registry {
    stores: BTreeMap<MetadataKey, Arc<TagStore>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store for `key`, creating and caching it on first use. Keys are
    /// looked up in [canonical](MetadataKey::canonical) form, so one element
    /// never belongs to two stores.
    pub fn get_or_create<H>(
        &mut self,
        key: &MetadataKey,
        head: &mut H,
    ) -> Result<Arc<TagStore>, SyncError>
    where
        H: HeadDocument + ?Sized,
    {
        let key = key.canonical();
        if let Some(store) = self.stores.get(&key) {
            return Ok(Arc::clone(store));
        }
        let store = Arc::new(TagStore::acquire(&key, head)?);
        tracing::debug!("registered tag store: {key}");
        self.stores.insert(key, Arc::clone(&store));
        Ok(store)
    }

    pub fn get(&self, key: &MetadataKey) -> Option<Arc<TagStore>> {
        self.stores.get(&key.canonical()).cloned()
    }

    /// Every key a store was ever created for, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &MetadataKey> {
        self.stores.keys()
    }

    pub fn stores(&self) -> impl Iterator<Item = &Arc<TagStore>> {
        self.stores.values()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use metasync_core::{Element, MemoryHead, MetaAttr};
    use rstest::rstest;

    use crate::node::Access;

    #[rstest]
    #[case(MetadataKey::Title, 2)]
    #[case(MetadataKey::Description, 1)]
    #[case(MetadataKey::OgTitle, 1)]
    #[case(MetadataKey::OgImage, 1)]
    #[case(MetadataKey::from("twitter:card"), 1)]
    fn node_layout(#[case] key: MetadataKey, #[case] nodes: usize) {
        assert_eq!(node_specs(&key).len(), nodes);
    }

    #[test]
    fn only_og_image_resolves_assets() {
        for key in MetadataKey::known() {
            let has_transform = node_specs(key).iter().any(|s| s.transform.is_some());
            assert_eq!(has_transform, *key == MetadataKey::OgImage, "key {key}");
        }
    }

    #[test]
    fn title_store_drives_text_and_meta() {
        let specs = node_specs(&MetadataKey::Title);
        assert_eq!(specs[0].access, Access::Text);
        assert_eq!(specs[1].selector, Selector::meta_name("title"));
    }

    #[test]
    fn unknown_key_uses_meta_name() {
        let specs = node_specs(&MetadataKey::from("robots"));
        assert_eq!(specs[0].selector.to_string(), r#"meta[name="robots"]"#);
    }

    #[test]
    fn registry_returns_same_instance() {
        let mut head = MemoryHead::new();
        let mut registry = Registry::new();
        let a = registry.get_or_create(&MetadataKey::Title, &mut head).expect("create");
        let b = registry.get_or_create(&MetadataKey::Title, &mut head).expect("cached");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
        assert_eq!(head.len(), 2, "title + meta[name=title]");
    }

    #[test]
    fn other_spelling_shares_known_store() {
        let mut head = MemoryHead::new();
        let mut registry = Registry::new();
        let other = MetadataKey::Other("title".into());
        let a = registry.get_or_create(&other, &mut head).expect("other");
        let b = registry.get_or_create(&MetadataKey::Title, &mut head).expect("title");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.key(), &MetadataKey::Title);
        assert!(registry.get(&other).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(head.count(&Selector::meta_name("title")), 1);
    }

    #[test]
    fn registry_does_not_duplicate_existing_elements() {
        let mut head = MemoryHead::from_elements([
            Element::title("Shop"),
            Element::meta(MetaAttr::Name, "og:title", "Shop OG"),
        ]);
        let mut registry = Registry::new();
        let og = registry.get_or_create(&MetadataKey::OgTitle, &mut head).expect("og");
        assert_eq!(og.primary().default_content(), "Shop OG");
        assert_eq!(head.count(&Selector::open_graph("og:title")), 1);
    }

    #[test]
    fn keys_lists_every_created_store() {
        let mut head = MemoryHead::new();
        let mut registry = Registry::new();
        registry.get_or_create(&MetadataKey::OgImage, &mut head).expect("og:image");
        registry.get_or_create(&MetadataKey::Description, &mut head).expect("description");
        let keys: Vec<_> = registry.keys().cloned().collect();
        assert_eq!(keys, vec![MetadataKey::Description, MetadataKey::OgImage]);
    }

    #[test]
    fn failed_node_does_not_block_sibling() {
        let mut head = MemoryHead::new();
        let mut registry = Registry::new();
        let title = registry.get_or_create(&MetadataKey::Title, &mut head).expect("title");
        head.detach(title.nodes()[0].element()).expect("detach");

        let cfg = SyncConfig::new("https://a.example").expect("valid");
        let result = title.apply(&mut head, &ContentValue::text("New"), &cfg);
        assert!(matches!(result, WriteResult::Failed { .. }));
        assert_eq!(title.nodes()[1].content(&head).expect("meta title"), "New");
    }
}
