// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Desired-state store: the in-process view of what must be terminated where.
//!
//! The store maps hostname → [`TerminationTarget`] and is the single piece
//! of state shared between the watch event adapter (writer) and the sync
//! loop (reader). Both run concurrently, so the map lives behind a lock;
//! the sync loop takes a snapshot copy before iterating so the lock is
//! never held across network calls.
//!
//! The store is rebuilt entirely from the watch stream on process start
//! and never persisted.

use crate::target::TerminationTarget;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Concurrency-safe map of hostname → termination target.
///
/// Cloning the store is cheap and shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct TargetStore {
    inner: Arc<RwLock<BTreeMap<String, TerminationTarget>>>,
}

impl TargetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the target for its host. Last writer wins.
    pub fn upsert(&self, target: TerminationTarget) {
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = map.insert(target.host.clone(), target) {
            debug!(host = %previous.host, "replaced existing termination target");
        }
    }

    /// Copy the current targets for lock-free iteration.
    ///
    /// The sync cycle works from this snapshot; upserts arriving while a
    /// cycle is in flight are picked up on the next cycle.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, TerminationTarget> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of targets currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
