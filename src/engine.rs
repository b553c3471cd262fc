//! The process-wide singleton wiring every component together: one cache
//! store, one blocking lock registry, one cooperative lock registry, one
//! never-die scheduler. Every memoizer reaches these through
//! [`Engine::global`] rather than owning its own copy — that's the whole
//! point of the never-die supervisor and sweeper being able to see every
//! registration and every entry in the process, not just the ones made
//! through a particular memoizer instance.

use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::lock::KeyedLockRegistry;
use crate::never_die::NeverDieScheduler;
use crate::store::{spawn_sweeper, CacheStore};

pub struct Engine {
    pub store: CacheStore,
    pub blocking_locks: KeyedLockRegistry<Mutex<()>>,
    #[cfg(feature = "async")]
    pub cooperative_locks: KeyedLockRegistry<tokio::sync::Mutex<()>>,
    pub never_die: NeverDieScheduler,
}

static ENGINE: Lazy<Engine> = Lazy::new(|| {
    let engine = Engine {
        store: CacheStore::new(),
        blocking_locks: KeyedLockRegistry::new(),
        #[cfg(feature = "async")]
        cooperative_locks: KeyedLockRegistry::new(),
        never_die: NeverDieScheduler::new(),
    };
    engine
});

static SWEEPER_STARTED: std::sync::Once = std::sync::Once::new();

impl Engine {
    /// The single engine instance for this process. Initializes lazily on
    /// first use and starts the sweeper daemon the first time it is
    /// reached.
    pub fn global() -> &'static Engine {
        let engine = &*ENGINE;
        SWEEPER_STARTED.call_once(|| spawn_sweeper(&engine.store));
        engine
    }
}
