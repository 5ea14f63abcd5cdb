//! Node handles: one head element plus the content it held before any
//! route wrote to it.
//!
//! A handle is configured by a [`NodeSpec`]: where the element lives
//! ([`Selector`]), where its content sits ([`Access`]) and an optional
//! [`Transform`] applied to incoming values.

use metasync_core::{ContentValue, ElementId, HeadDocument, HeadError, Selector, SyncConfig};

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

/// Where a node keeps its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Element text (`<title>`).
    Text,
    /// A named attribute (`content` on `meta`).
    Attribute(&'static str),
}

/// Rewrite applied to a value before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Resolve asset references to `<origin>/<asset_prefix>/<path>`.
    AssetUrl,
}

/// Everything needed to locate and drive one head element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub selector: Selector,
    pub access: Access,
    pub transform: Option<Transform>,
}

impl NodeSpec {
    /// The `<title>` text node.
    pub fn title_text() -> Self {
        Self {
            selector: Selector::Title,
            access: Access::Text,
            transform: None,
        }
    }

    /// A `meta` element's `content` attribute.
    pub fn meta_content(selector: Selector) -> Self {
        Self {
            selector,
            access: Access::Attribute("content"),
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// The string actually stored for `value`.
    ///
    /// Asset references are resolved only when the node carries
    /// [`Transform::AssetUrl`]; a malformed reference stores its relative
    /// path. Nodes without the transform store the value's string form, so
    /// `asset:` text in a title reaches the page as the router sent it.
    pub fn render(&self, value: &ContentValue, config: &SyncConfig) -> String {
        match (value, self.transform) {
            (ContentValue::AssetReference(path), Some(Transform::AssetUrl)) => {
                resolve_asset(path, config).unwrap_or_else(|| {
                    tracing::warn!(
                        "malformed asset reference '{path}' for {}; writing it unresolved",
                        self.selector
                    );
                    path.clone()
                })
            }
            (ContentValue::PlainText(text), _) => text.clone(),
            (ContentValue::AssetReference(_), None) => value.to_string(),
        }
    }
}

/// Absolute URL of a bundled asset, or `None` if `path` is not a usable
/// relative path.
///
/// A path that already starts with the asset prefix (`_/theme/logo.png` or
/// `/_/theme/logo.png`) is not prefixed twice.
pub fn resolve_asset(path: &str, config: &SyncConfig) -> Option<String> {
    let path = path.trim();
    if path.contains("://") {
        return None;
    }
    let path = path.trim_start_matches('/');
    let prefix = config.asset_prefix.as_str();
    let relative = if prefix.is_empty() {
        path
    } else {
        path.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
    };
    if relative.is_empty() {
        return None;
    }
    let origin = config.app_origin.as_str();
    Some(if prefix.is_empty() {
        format!("{origin}/{relative}")
    } else {
        format!("{origin}/{prefix}/{relative}")
    })
}

// ---------------------------------------------------------------------------
// NodeHandle
// ---------------------------------------------------------------------------

/// A head element bound to its captured default content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    spec: NodeSpec,
    element: ElementId,
    default_content: String,
}

impl NodeHandle {
    /// Find the element for `spec`, appending an empty one if the head has
    /// none, and capture its current content as the default.
    ///
    /// Repeated calls for the same spec reuse the existing element.
    pub fn get_or_create<H>(head: &mut H, spec: NodeSpec) -> Result<Self, HeadError>
    where
        H: HeadDocument + ?Sized,
    {
        let element = match head.query(&spec.selector) {
            Some(id) => id,
            None => {
                tracing::debug!("creating missing head element: {}", spec.selector);
                head.append(spec.selector.blank_element())
            }
        };
        let default_content = read(head, element, spec.access)?;
        Ok(Self {
            spec,
            element,
            default_content,
        })
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.spec
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Content observed when the handle was first acquired.
    pub fn default_content(&self) -> &str {
        &self.default_content
    }

    pub fn content<H>(&self, head: &H) -> Result<String, HeadError>
    where
        H: HeadDocument + ?Sized,
    {
        read(head, self.element, self.spec.access)
    }

    /// Write `value` (after the node's transform). Returns `true` if the
    /// element changed; identical content is not rewritten.
    pub fn set_content<H>(
        &self,
        head: &mut H,
        value: &ContentValue,
        config: &SyncConfig,
    ) -> Result<bool, HeadError>
    where
        H: HeadDocument + ?Sized,
    {
        let rendered = self.spec.render(value, config);
        self.write(head, &rendered)
    }

    /// Restore the captured default. Returns `true` if the element changed.
    pub fn reset<H>(&self, head: &mut H) -> Result<bool, HeadError>
    where
        H: HeadDocument + ?Sized,
    {
        self.write(head, &self.default_content)
    }

    fn write<H>(&self, head: &mut H, content: &str) -> Result<bool, HeadError>
    where
        H: HeadDocument + ?Sized,
    {
        if self.content(head)? == content {
            return Ok(false);
        }
        match self.spec.access {
            Access::Text => head.set_text(self.element, content)?,
            Access::Attribute(name) => head.set_attribute(self.element, name, content)?,
        }
        Ok(true)
    }
}

fn read<H>(head: &H, element: ElementId, access: Access) -> Result<String, HeadError>
where
    H: HeadDocument + ?Sized,
{
    match access {
        Access::Text => head.text(element),
        Access::Attribute(name) => Ok(head.attribute(element, name)?.unwrap_or_default()),
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

    fn config() -> SyncConfig {
        SyncConfig::new("https://app.example.com").expect("valid origin")
    }

    fn image_spec() -> NodeSpec {
        NodeSpec::meta_content(Selector::open_graph("og:image")).with_transform(Transform::AssetUrl)
    }

    #[rstest]
    #[case("logo.png", Some("https://app.example.com/_/theme/logo.png"))]
    #[case("img/hero.jpg", Some("https://app.example.com/_/theme/img/hero.jpg"))]
    #[case("/logo.png", Some("https://app.example.com/_/theme/logo.png"))]
    #[case("_/theme/logo.png", Some("https://app.example.com/_/theme/logo.png"))]
    #[case("/_/theme/logo.png", Some("https://app.example.com/_/theme/logo.png"))]
    #[case("", None)]
    #[case("/", None)]
    #[case("https://cdn.example.com/logo.png", None)]
    fn asset_resolution(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(resolve_asset(path, &config()).as_deref(), expected);
    }

    #[test]
    fn empty_prefix_joins_origin_directly() {
        let mut cfg = config();
        cfg.asset_prefix = String::new();
        assert_eq!(
            resolve_asset("logo.png", &cfg).as_deref(),
            Some("https://app.example.com/logo.png")
        );
    }

    #[test]
    fn render_without_transform_keeps_marker() {
        let spec = NodeSpec::meta_content(Selector::meta_name("description"));
        assert_eq!(spec.render(&ContentValue::asset("logo.png"), &config()), "asset:logo.png");
        assert_eq!(
            NodeSpec::title_text().render(&ContentValue::parse("asset: a retrospective"), &config()),
            "asset: a retrospective"
        );
    }

    #[test]
    fn render_malformed_asset_passes_through() {
        assert_eq!(image_spec().render(&ContentValue::asset(""), &config()), "");
        assert_eq!(
            image_spec().render(&ContentValue::asset("http://x.io/a.png"), &config()),
            "http://x.io/a.png"
        );
    }

    #[test]
    fn plain_text_is_verbatim_even_with_transform() {
        assert_eq!(image_spec().render(&ContentValue::text("logo.png"), &config()), "logo.png");
    }

    #[test]
    fn get_or_create_appends_once() {
        let mut head = MemoryHead::new();
        let first = NodeHandle::get_or_create(&mut head, image_spec()).expect("create");
        let second = NodeHandle::get_or_create(&mut head, image_spec()).expect("reuse");
        assert_eq!(first.element(), second.element());
        assert_eq!(head.count(&Selector::open_graph("og:image")), 1);
        assert_eq!(first.default_content(), "");
    }

    #[test]
    fn default_is_captured_from_existing_element() {
        let mut head = MemoryHead::from_elements([Element::title("Shop")]);
        let node = NodeHandle::get_or_create(&mut head, NodeSpec::title_text()).expect("acquire");
        assert_eq!(node.default_content(), "Shop");

        node.set_content(&mut head, &ContentValue::text("Cart"), &config())
            .expect("write");
        assert_eq!(node.content(&head).expect("read"), "Cart");
        assert_eq!(node.default_content(), "Shop");

        assert!(node.reset(&mut head).expect("reset"));
        assert_eq!(node.content(&head).expect("read"), "Shop");
    }

    #[test]
    fn identical_write_reports_no_change() {
        let mut head = MemoryHead::from_elements([Element::meta(MetaAttr::Name, "description", "d")]);
        let node = NodeHandle::get_or_create(
            &mut head,
            NodeSpec::meta_content(Selector::meta_name("description")),
        )
        .expect("acquire");
        assert!(!node.set_content(&mut head, &ContentValue::text("d"), &config()).expect("write"));
        assert!(node.set_content(&mut head, &ContentValue::text("e"), &config()).expect("write"));
        assert!(node.reset(&mut head).expect("reset"));
    }

    #[test]
    fn meta_without_content_attribute_reads_empty() {
        let mut head = MemoryHead::from_elements([Element::new("meta").with_attr("name", "robots")]);
        let node = NodeHandle::get_or_create(
            &mut head,
            NodeSpec::meta_content(Selector::meta_name("robots")),
        )
        .expect("acquire");
        assert_eq!(node.default_content(), "");
    }

    #[test]
    fn detached_element_write_fails() {
        let mut head = MemoryHead::new();
        let node = NodeHandle::get_or_create(&mut head, NodeSpec::title_text()).expect("acquire");
        head.detach(node.element()).expect("detach");
        let err = node
            .set_content(&mut head, &ContentValue::text("x"), &config())
            .unwrap_err();
        assert_eq!(err, HeadError::Detached(node.element()));
    }
}
