//! Dry-run unified diff support for `metasync diff`.

use similar::TextDiff;

use metasync_core::{MemoryHead, Metadata, SyncConfig};

use crate::synchronizer::{Synchronizer, UpdateReport};

/// What replaying a sequence of routes would do to a head.
#[derive(Debug, Clone)]
pub struct HeadDiff {
    pub before: MemoryHead,
    pub after: MemoryHead,
    pub reports: Vec<UpdateReport>,
    /// Empty when the replay leaves the head unchanged.
    pub unified_diff: String,
}

/// Replay `routes` in order against a copy of `head`.
///
/// `head` itself is not modified.
pub fn preview(head: &MemoryHead, config: &SyncConfig, routes: &[Metadata]) -> HeadDiff {
    let mut sync = Synchronizer::new(head.clone(), config.clone());
    let reports = routes.iter().map(|meta| sync.update(meta)).collect();
    let after = sync.into_head();
    HeadDiff {
        unified_diff: head_diff(head, &after),
        before: head.clone(),
        after,
        reports,
    }
}

/// Unified diff of two heads' markup, or an empty string if they match.
pub fn head_diff(before: &MemoryHead, after: &MemoryHead) -> String {
    let old = before.to_markup();
    let new = after.to_markup();
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header("a/head", "b/head")
        .context_radius(3)
        .to_string()
}
