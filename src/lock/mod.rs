//! Keyed mutual exclusion: one lock per `(function_id, fingerprint)` pair,
//! created lazily and kept only as long as something references it.

use std::sync::Arc;

use dashmap::DashMap;

use crate::function_id::FunctionId;

/// A registry of per-key locks of type `L`. Used with `std::sync::Mutex<()>`
/// for the blocking world and `tokio::sync::Mutex<()>` for the cooperative
/// one — same structure, different lock primitive, matching the two
/// concurrency universes calls can arrive from.
pub struct KeyedLockRegistry<L> {
    locks: DashMap<(Arc<str>, String), Arc<L>>,
}

impl<L: Default> KeyedLockRegistry<L> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock for `(function_id, fingerprint)`, creating it if this is
    /// the first time the pair has been seen. Never removes locks itself —
    /// a never-die entry's lock is expected to live for as long as its
    /// registration does, and a one-shot call's lock is cheap enough to
    /// simply accumulate (bounded by the number of distinct calls ever
    /// made, same order of magnitude as the cache store itself).
    pub fn get_or_create(&self, function_id: &FunctionId, fingerprint: &str) -> Arc<L> {
        self.locks
            .entry((function_id.as_arc_str(), fingerprint.to_owned()))
            .or_insert_with(|| Arc::new(L::default()))
            .clone()
    }
}

impl<L: Default> Default for KeyedLockRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Acquire a `std::sync::Mutex`, recovering from poisoning rather than
/// propagating the panic — a panicking callable should not wedge the key's
/// lock for every future caller.
pub fn lock_recovering<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
