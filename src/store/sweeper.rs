use std::thread;
use std::time::Duration;

use super::CacheStore;

/// How often the sweeper daemon walks the store looking for expired
/// TTL-bound entries.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(10);

/// Start the background daemon that periodically removes expired entries
/// from `store`. Runs for the lifetime of the process; never joined.
pub fn spawn_sweeper(store: &'static CacheStore) {
    thread::Builder::new()
        .name("kasheless-sweeper".to_owned())
        .spawn(move || loop {
            thread::sleep(SWEEP_PERIOD);
            let removed = store.sweep_expired();
            tracing::trace!(removed, "sweep cycle complete");
        })
        .expect("failed to spawn sweeper thread");
}
