//! Head-document capability.
//!
//! [`HeadDocument`] is the only way the synchronizer touches the page. A
//! browser binding forwards [`Selector`]'s CSS form to `querySelector`;
//! [`MemoryHead`] keeps the head as a plain element list, which backs tests
//! and the `metasync` replay tool.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HeadError;

// ---------------------------------------------------------------------------
// Elements and selectors
// ---------------------------------------------------------------------------

/// Stable handle to an element inside a head document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A head element: tag name, attributes, text content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// `<title>` element with the given text.
    pub fn title(text: impl Into<String>) -> Self {
        Self::new("title").with_text(text)
    }

    /// `<meta {attr}="{key}" content="{content}">`.
    pub fn meta(attr: MetaAttr, key: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new("meta")
            .with_attr(attr.as_str(), key)
            .with_attr("content", content)
    }

    fn to_markup(&self) -> String {
        let mut out = format!("<{}", self.tag);
        // Identifying attributes first, `content` last.
        let ordered = self
            .attrs
            .iter()
            .filter(|(k, _)| k.as_str() != "content")
            .chain(self.attrs.get_key_value("content"));
        for (name, value) in ordered {
            out.push_str(&format!(" {name}=\"{}\"", escape(value)));
        }
        out.push('>');
        if self.tag != "meta" {
            out.push_str(&escape(&self.text));
            out.push_str(&format!("</{}>", self.tag));
        }
        out
    }
}

/// Attribute a `meta` element is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaAttr {
    Name,
    Property,
}

impl MetaAttr {
    pub fn as_str(self) -> &'static str {
        match self {
            MetaAttr::Name => "name",
            MetaAttr::Property => "property",
        }
    }
}

/// Locates one head element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// The document's `<title>` element.
    Title,
    /// A `meta` element whose attribute (any of `attrs`) equals `key`.
    /// The first attribute is the one used when the element is created.
    Meta { attrs: Vec<MetaAttr>, key: String },
}

impl Selector {
    /// `meta[name="<key>"]`
    pub fn meta_name(key: impl Into<String>) -> Self {
        Selector::Meta {
            attrs: vec![MetaAttr::Name],
            key: key.into(),
        }
    }

    /// `meta[property="<key>"], meta[name="<key>"]`
    pub fn open_graph(key: impl Into<String>) -> Self {
        Selector::Meta {
            attrs: vec![MetaAttr::Property, MetaAttr::Name],
            key: key.into(),
        }
    }

    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Title => element.tag == "title",
            Selector::Meta { attrs, key } => {
                element.tag == "meta"
                    && attrs
                        .iter()
                        .any(|a| element.attrs.get(a.as_str()) == Some(key))
            }
        }
    }

    /// The empty element appended when nothing matches.
    pub fn blank_element(&self) -> Element {
        match self {
            Selector::Title => Element::title(""),
            Selector::Meta { attrs, key } => {
                let attr = attrs.first().copied().unwrap_or(MetaAttr::Name);
                Element::meta(attr, key.clone(), "")
            }
        }
    }
}

impl fmt::Display for Selector {
    /// CSS selector list, suitable for `querySelector`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Title => f.write_str("title"),
            Selector::Meta { attrs, key } => {
                let parts: Vec<String> = attrs
                    .iter()
                    .map(|a| format!("meta[{}=\"{key}\"]", a.as_str()))
                    .collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// The document head, as seen by the synchronizer.
pub trait HeadDocument {
    /// First element matching `selector`, in document order.
    fn query(&self, selector: &Selector) -> Option<ElementId>;

    /// Append `element` to the head and return its id.
    fn append(&mut self, element: Element) -> ElementId;

    fn text(&self, id: ElementId) -> Result<String, HeadError>;

    fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), HeadError>;

    fn attribute(&self, id: ElementId, name: &str) -> Result<Option<String>, HeadError>;

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), HeadError>;
}

// ---------------------------------------------------------------------------
// MemoryHead
// ---------------------------------------------------------------------------

/// In-memory head document.
///
/// Serializes as `{"elements": [...]}`; detachment is runtime state and is
/// not part of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryHead {
    elements: Vec<Element>,
    #[serde(skip)]
    detached: BTreeSet<usize>,
}

impl MemoryHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
            detached: BTreeSet::new(),
        }
    }

    /// Attached elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.detached.contains(i))
            .map(|(_, el)| el)
    }

    pub fn len(&self) -> usize {
        self.elements.len() - self.detached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of attached elements matching `selector`.
    pub fn count(&self, selector: &Selector) -> usize {
        self.elements().filter(|el| selector.matches(el)).count()
    }

    /// Remove an element from the head. Later reads and writes through its
    /// id fail with [`HeadError::Detached`].
    pub fn detach(&mut self, id: ElementId) -> Result<(), HeadError> {
        self.get(id)?;
        self.detached.insert(id.0);
        Ok(())
    }

    /// Put a detached element back, with the content it had when removed.
    pub fn reattach(&mut self, id: ElementId) -> Result<(), HeadError> {
        if !self.detached.remove(&id.0) {
            self.get(id)?;
        }
        Ok(())
    }

    /// One line of markup per attached element.
    pub fn to_markup(&self) -> String {
        self.elements()
            .map(|el| el.to_markup() + "\n")
            .collect()
    }

    fn get(&self, id: ElementId) -> Result<&Element, HeadError> {
        if self.detached.contains(&id.0) {
            return Err(HeadError::Detached(id));
        }
        self.elements.get(id.0).ok_or(HeadError::UnknownElement(id))
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element, HeadError> {
        if self.detached.contains(&id.0) {
            return Err(HeadError::Detached(id));
        }
        self.elements
            .get_mut(id.0)
            .ok_or(HeadError::UnknownElement(id))
    }
}

impl HeadDocument for MemoryHead {
    fn query(&self, selector: &Selector) -> Option<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .find(|(i, el)| !self.detached.contains(i) && selector.matches(el))
            .map(|(i, _)| ElementId(i))
    }

    fn append(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    fn text(&self, id: ElementId) -> Result<String, HeadError> {
        Ok(self.get(id)?.text.clone())
    }

    fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), HeadError> {
        self.get_mut(id)?.text = text.to_owned();
        Ok(())
    }

    fn attribute(&self, id: ElementId, name: &str) -> Result<Option<String>, HeadError> {
        Ok(self.get(id)?.attrs.get(name).cloned())
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), HeadError> {
        self.get_mut(id)?
            .attrs
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Selector::Title, "title")]
    #[case(Selector::meta_name("description"), r#"meta[name="description"]"#)]
    #[case(
        Selector::open_graph("og:title"),
        r#"meta[property="og:title"], meta[name="og:title"]"#
    )]
    fn selector_css_form(#[case] selector: Selector, #[case] css: &str) {
        assert_eq!(selector.to_string(), css);
    }

    #[test]
    fn open_graph_selector_matches_either_attribute() {
        let sel = Selector::open_graph("og:title");
        assert!(sel.matches(&Element::meta(MetaAttr::Property, "og:title", "")));
        assert!(sel.matches(&Element::meta(MetaAttr::Name, "og:title", "")));
        assert!(!sel.matches(&Element::meta(MetaAttr::Name, "title", "")));
    }

    #[test]
    fn meta_name_selector_ignores_property() {
        let sel = Selector::meta_name("description");
        assert!(!sel.matches(&Element::meta(MetaAttr::Property, "description", "")));
    }

    #[test]
    fn blank_element_uses_first_attribute() {
        let el = Selector::open_graph("og:image").blank_element();
        assert_eq!(el.attrs.get("property").map(String::as_str), Some("og:image"));
        assert_eq!(el.attrs.get("content").map(String::as_str), Some(""));
        assert_eq!(Selector::Title.blank_element(), Element::title(""));
    }

    #[test]
    fn query_returns_first_in_document_order() {
        let head = MemoryHead::from_elements([
            Element::meta(MetaAttr::Name, "og:title", "by name"),
            Element::meta(MetaAttr::Property, "og:title", "by property"),
        ]);
        assert_eq!(head.query(&Selector::open_graph("og:title")), Some(ElementId(0)));
    }

    #[test]
    fn detached_elements_are_invisible() {
        let mut head = MemoryHead::from_elements([Element::title("Home")]);
        let id = head.query(&Selector::Title).expect("title");
        head.detach(id).expect("detach");
        assert_eq!(head.query(&Selector::Title), None);
        assert_eq!(head.text(id), Err(HeadError::Detached(id)));
        assert!(head.is_empty());

        head.reattach(id).expect("reattach");
        assert_eq!(head.text(id), Ok("Home".to_owned()));
        assert_eq!(head.reattach(ElementId(9)), Err(HeadError::UnknownElement(ElementId(9))));
    }

    #[test]
    fn unknown_id_is_an_error() {
        let head = MemoryHead::new();
        assert_eq!(
            head.attribute(ElementId(3), "content"),
            Err(HeadError::UnknownElement(ElementId(3)))
        );
    }

    #[test]
    fn markup_escapes_and_orders_content_last() {
        let head = MemoryHead::from_elements([
            Element::title("A & B"),
            Element::meta(MetaAttr::Name, "description", "say \"hi\""),
        ]);
        assert_eq!(
            head.to_markup(),
            "<title>A &amp; B</title>\n<meta name=\"description\" content=\"say &quot;hi&quot;\">\n"
        );
    }

    #[test]
    fn snapshot_json_shape() {
        let json = r#"{"elements":[{"tag":"title","text":"Home"},{"tag":"meta","attrs":{"content":"Welcome","name":"description"}}]}"#;
        let head: MemoryHead = serde_json::from_str(json).expect("parse");
        assert_eq!(head.len(), 2);
        assert_eq!(serde_json::to_string(&head).expect("serialize"), json);
    }
}
