//! Metadata domain types.
//!
//! A route declares its head metadata as a [`Metadata`] mapping from
//! [`MetadataKey`] to [`ContentValue`]. Keys outside the known set are kept
//! as [`MetadataKey::Other`] and handled as plain `meta[name=...]` tags.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MetadataKey
// ---------------------------------------------------------------------------

/// Identifier of one logical piece of head metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetadataKey {
    Title,
    Description,
    OgTitle,
    OgDescription,
    OgImage,
    /// Any other name; rendered as a generic `meta[name="<key>"]` tag.
    Other(String),
}

impl MetadataKey {
    /// Every key with dedicated handling, in declaration order.
    pub fn known() -> &'static [MetadataKey] {
        &[
            MetadataKey::Title,
            MetadataKey::Description,
            MetadataKey::OgTitle,
            MetadataKey::OgDescription,
            MetadataKey::OgImage,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            MetadataKey::Title => "title",
            MetadataKey::Description => "description",
            MetadataKey::OgTitle => "og:title",
            MetadataKey::OgDescription => "og:description",
            MetadataKey::OgImage => "og:image",
            MetadataKey::Other(name) => name,
        }
    }

    /// Known names spelled as [`Other`](MetadataKey::Other) folded back to
    /// their dedicated variant.
    pub fn canonical(&self) -> MetadataKey {
        match self {
            MetadataKey::Other(name) => MetadataKey::from(name.as_str()),
            known => known.clone(),
        }
    }

    /// `true` for the Open Graph keys (`og:*`), including unknown ones.
    pub fn is_open_graph(&self) -> bool {
        self.as_str().starts_with("og:")
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MetadataKey {
    fn from(s: &str) -> Self {
        match s {
            "title" => MetadataKey::Title,
            "description" => MetadataKey::Description,
            "og:title" => MetadataKey::OgTitle,
            "og:description" => MetadataKey::OgDescription,
            "og:image" => MetadataKey::OgImage,
            other => MetadataKey::Other(other.to_owned()),
        }
    }
}

impl From<String> for MetadataKey {
    fn from(s: String) -> Self {
        match MetadataKey::from(s.as_str()) {
            MetadataKey::Other(_) => MetadataKey::Other(s),
            known => known,
        }
    }
}

impl From<MetadataKey> for String {
    fn from(key: MetadataKey) -> Self {
        match key {
            MetadataKey::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// ContentValue
// ---------------------------------------------------------------------------

/// Content to place in a head element.
///
/// The caller decides whether a value is literal text or a reference to an
/// application-bundled asset; asset references are resolved to absolute URLs
/// by nodes that carry the asset transform.
///
/// The string form is not escaped: plain text that itself begins with
/// `asset:` reads back as an [`AssetReference`](ContentValue::AssetReference).
/// Nodes without the asset transform write both forms identically, so only
/// `og:image` can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentValue {
    PlainText(String),
    /// Path relative to the application's asset root.
    AssetReference(String),
}

impl ContentValue {
    /// Marker used by the string form of an asset reference (`asset:logo.png`).
    pub const ASSET_MARKER: &'static str = "asset:";

    pub fn text(s: impl Into<String>) -> Self {
        ContentValue::PlainText(s.into())
    }

    pub fn asset(path: impl Into<String>) -> Self {
        ContentValue::AssetReference(path.into())
    }

    /// Decode the router-facing string form.
    ///
    /// `asset:<path>` becomes an [`AssetReference`](ContentValue::AssetReference);
    /// everything else is plain text.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(Self::ASSET_MARKER) {
            Some(path) => ContentValue::AssetReference(path.to_owned()),
            None => ContentValue::PlainText(raw.to_owned()),
        }
    }

    /// The raw payload: the text, or the relative asset path.
    pub fn as_str(&self) -> &str {
        match self {
            ContentValue::PlainText(s) | ContentValue::AssetReference(s) => s,
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, ContentValue::AssetReference(_))
    }
}

impl fmt::Display for ContentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentValue::PlainText(s) => f.write_str(s),
            ContentValue::AssetReference(path) => write!(f, "{}{path}", Self::ASSET_MARKER),
        }
    }
}

impl From<String> for ContentValue {
    fn from(s: String) -> Self {
        ContentValue::parse(&s)
    }
}

impl From<ContentValue> for String {
    fn from(value: ContentValue) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// The metadata a route declares. Ordered so iteration (and logging) is
/// deterministic.
pub type Metadata = BTreeMap<MetadataKey, ContentValue>;

/// Build [`Metadata`] from a plain string mapping, parsing keys and values.
pub fn parse_metadata<I, K, V>(raw: I) -> Metadata
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    raw.into_iter()
        .map(|(k, v)| (MetadataKey::from(k.as_ref()), ContentValue::parse(v.as_ref())))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
