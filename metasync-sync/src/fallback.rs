//! Fallback resolution: Open Graph keys borrow the value of their plain
//! counterpart when a route leaves them out.

use metasync_core::{Metadata, MetadataKey};

/// `(dependent, source)` pairs. Applied one level deep: a value filled in by
/// a fallback is never the source of another fallback.
pub const FALLBACK_TABLE: [(MetadataKey, MetadataKey); 2] = [
    (MetadataKey::OgTitle, MetadataKey::Title),
    (MetadataKey::OgDescription, MetadataKey::Description),
];

/// The declared metadata, keys in canonical form, plus any fallback values.
/// Pure; touches no head.
pub fn resolve(meta: &Metadata) -> Metadata {
    let declared: Metadata = meta
        .iter()
        .map(|(key, value)| (key.canonical(), value.clone()))
        .collect();
    let mut effective = declared.clone();
    for (dependent, source) in FALLBACK_TABLE.iter() {
        if declared.contains_key(dependent) {
            continue;
        }
        if let Some(value) = declared.get(source) {
            effective.insert(dependent.clone(), value.clone());
        }
    }
    effective
}
