use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One stored result, type-erased so the single process-wide store can hold
/// results from many differently-typed memoizers at once.
pub struct CacheEntry {
    pub(crate) value: Arc<dyn Any + Send + Sync>,
    pub(crate) ttl: Option<Duration>,
    cached_at: Instant,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    #[must_use]
    pub fn new(value: Arc<dyn Any + Send + Sync>, ttl: Option<Duration>) -> Self {
        let cached_at = Instant::now();
        let expires_at = ttl.map(|ttl| cached_at + ttl);
        Self {
            value,
            ttl,
            cached_at,
            expires_at,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    #[must_use]
    pub fn cached_at(&self) -> Instant {
        self.cached_at
    }
}
