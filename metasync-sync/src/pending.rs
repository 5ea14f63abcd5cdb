//! Serializing updates from routers that can fire out of order.
//!
//! [`LatestOnly`] coalesces bursts of navigation into the most recent
//! metadata; [`SharedSynchronizer`] runs each whole update under one lock
//! for hosts where several threads can navigate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use metasync_core::{HeadDocument, Metadata};

use crate::synchronizer::{Synchronizer, UpdateReport};

/// Holds at most one pending metadata mapping; newer submissions replace
/// older ones so the last route always wins.
#[derive(Debug, Default)]
pub struct LatestOnly {
    pending: Option<Metadata>,
    superseded: u64,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `meta`, dropping any mapping still waiting. Returns `true` if a
    /// pending mapping was replaced.
    pub fn submit(&mut self, meta: Metadata) -> bool {
        let replaced = self.pending.replace(meta).is_some();
        if replaced {
            self.superseded += 1;
            tracing::debug!("superseded pending metadata update");
        }
        replaced
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of submissions dropped in favour of a newer one.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    /// Apply the most recent pending mapping, if any.
    pub fn flush<H: HeadDocument>(&mut self, sync: &mut Synchronizer<H>) -> Option<UpdateReport> {
        self.pending.take().map(|meta| sync.update(&meta))
    }
}

/// A [`Synchronizer`] shared between threads. Each call holds the lock for
/// the entire update, so no two updates interleave.
#[derive(Debug)]
pub struct SharedSynchronizer<H> {
    inner: Arc<Mutex<Synchronizer<H>>>,
}

impl<H> Clone for SharedSynchronizer<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: HeadDocument> SharedSynchronizer<H> {
    pub fn new(sync: Synchronizer<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sync)),
        }
    }

    pub fn update(&self, meta: &Metadata) -> UpdateReport {
        self.lock().update(meta)
    }

    /// Run `f` with exclusive access, e.g. to read the head.
    pub fn with<R>(&self, f: impl FnOnce(&mut Synchronizer<H>) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    // Poisoning is ignored: every update converges from any head state.
    fn lock(&self) -> MutexGuard<'_, Synchronizer<H>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
