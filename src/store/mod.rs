//! The single, process-wide cache store every memoizer reads and writes.

mod entry;
mod sweeper;

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

pub use entry::CacheEntry;
pub use sweeper::spawn_sweeper;

use crate::function_id::FunctionId;

pub(crate) type StoreKey = (Arc<str>, String);

/// Backed by a [`moka::sync::Cache`] used purely as a concurrent map: moka's
/// own size/time eviction is left disabled (`.build()` with no policy)
/// because TTL here is heterogeneous per function and never-die entries
/// carry no TTL at all, so expiry is decided entry-by-entry rather than by
/// one store-wide policy.
pub struct CacheStore {
    entries: moka::sync::Cache<StoreKey, Arc<CacheEntry>>,
}

impl CacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: moka::sync::Cache::builder().build(),
        }
    }

    fn store_key(function_id: &FunctionId, fingerprint: &str) -> StoreKey {
        (function_id.as_arc_str(), fingerprint.to_owned())
    }

    /// Look up a live (non-expired) entry. `skip_cache` short-circuits to a
    /// miss without touching the store, mirroring a call made with
    /// `skip_cache=True`.
    #[must_use]
    pub fn get(&self, function_id: &FunctionId, fingerprint: &str, skip_cache: bool) -> Option<Arc<CacheEntry>> {
        if skip_cache {
            return None;
        }
        let entry = self.entries.get(&Self::store_key(function_id, fingerprint))?;
        if entry.is_expired() {
            None
        } else {
            Some(entry)
        }
    }

    pub fn set(
        &self,
        function_id: &FunctionId,
        fingerprint: &str,
        value: Arc<dyn Any + Send + Sync>,
        ttl: Option<Duration>,
    ) {
        let key = Self::store_key(function_id, fingerprint);
        self.entries.insert(key, Arc::new(CacheEntry::new(value, ttl)));
    }

    pub fn invalidate(&self, function_id: &FunctionId, fingerprint: &str) {
        self.entries.invalidate(&Self::store_key(function_id, fingerprint));
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Remove every entry whose TTL has elapsed. Returns the number
    /// removed. Entries with no TTL (`ttl: None`, the never-die case) are
    /// never swept — their refresh is handled by the supervisor.
    pub(crate) fn sweep_expired(&self) -> usize {
        self.entries.run_pending_tasks();
        let expired: Vec<StoreKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.ttl.is_some() && entry.is_expired())
            .map(|(key, _)| (*key).clone())
            .collect();
        let removed = expired.len();
        for key in expired {
            self.entries.invalidate(&key);
        }
        removed
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function_id::FunctionId;
    use std::thread;

    #[test]
    fn expired_ttl_bound_entry_is_swept() {
        let store = CacheStore::new();
        let function_id = FunctionId::anonymous();
        store.set(&function_id, "k", Arc::new(1_i64), Some(Duration::from_millis(10)));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(store.sweep_expired(), 1);
        assert!(store.get(&function_id, "k", false).is_none());
    }

    #[test]
    fn never_die_entry_is_never_swept() {
        let store = CacheStore::new();
        let function_id = FunctionId::anonymous();
        store.set(&function_id, "k", Arc::new(1_i64), None);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(store.sweep_expired(), 0);
        assert!(store.get(&function_id, "k", false).is_some());
    }

    #[test]
    fn skip_cache_short_circuits_to_a_miss() {
        let store = CacheStore::new();
        let function_id = FunctionId::anonymous();
        store.set(&function_id, "k", Arc::new(1_i64), Some(Duration::from_secs(60)));
        assert!(store.get(&function_id, "k", true).is_none());
        assert!(store.get(&function_id, "k", false).is_some());
    }
}
