//! Background refresh for functions that must never serve a hard cache
//! miss once primed: the store keeps serving the last good value while a
//! supervisor thread recomputes it out of band, backing off on failure.

mod entry;
mod scheduler;
#[cfg(feature = "async")]
mod tokio_scheduler;

pub use entry::ExecutionContext;
pub use scheduler::{CooperativeScheduler, SchedulerClosed, TaskHandle};
#[cfg(feature = "async")]
pub use tokio_scheduler::TokioScheduler;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use dashmap::DashMap;

use crate::engine::Engine;
use crate::function_id::FunctionId;
use crate::lock::lock_recovering;
use entry::NeverDieEntry;

type InFlightKey = (Arc<str>, String);

/// How often the supervisor wakes up to check whether any registration is
/// due for a refresh.
pub const SUPERVISOR_PERIOD: Duration = Duration::from_millis(100);

/// Holds every standing never-die registration for the process and drives
/// their background refresh.
pub struct NeverDieScheduler {
    registrations: Mutex<Vec<Arc<NeverDieEntry>>>,
    blocking_in_flight: DashMap<InFlightKey, thread::JoinHandle<()>>,
    #[cfg(feature = "async")]
    cooperative_in_flight: DashMap<InFlightKey, Box<dyn TaskHandle>>,
    supervisor_started: AtomicBool,
}

impl NeverDieScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            blocking_in_flight: DashMap::new(),
            #[cfg(feature = "async")]
            cooperative_in_flight: DashMap::new(),
            supervisor_started: AtomicBool::new(false),
        }
    }

    /// Register a never-die call. A second registration for the same
    /// `(function_id, fingerprint)` is a no-op: the first one's captured
    /// arguments and execution context stand.
    pub fn register(
        &'static self,
        function_id: FunctionId,
        fingerprint: String,
        ttl: Duration,
        context: ExecutionContext,
    ) {
        {
            let mut regs = lock_recovering(&self.registrations);
            let already = regs
                .iter()
                .any(|r| r.function_id == function_id && r.fingerprint == fingerprint);
            if already {
                return;
            }
            regs.push(Arc::new(NeverDieEntry::new(function_id, fingerprint, ttl, context)));
        }
        self.ensure_supervisor_started();
    }

    fn ensure_supervisor_started(&'static self) {
        if self.supervisor_started.swap(true, Ordering::SeqCst) {
            return;
        }
        thread::Builder::new()
            .name("kasheless-never-die-supervisor".to_owned())
            .spawn(move || self.supervisor_loop())
            .expect("failed to spawn never-die supervisor thread");
    }

    fn supervisor_loop(&'static self) {
        loop {
            thread::sleep(SUPERVISOR_PERIOD);
            let snapshot: Vec<Arc<NeverDieEntry>> = lock_recovering(&self.registrations).clone();
            for reg in &snapshot {
                if reg.is_due() {
                    self.dispatch_refresh(reg.clone());
                }
            }
            self.blocking_in_flight.retain(|_, handle| !handle.is_finished());
            #[cfg(feature = "async")]
            self.cooperative_in_flight.retain(|_, handle| !handle.is_finished());
        }
    }

    fn in_flight_key(reg: &NeverDieEntry) -> InFlightKey {
        (reg.function_id.as_arc_str(), reg.fingerprint.clone())
    }

    fn dispatch_refresh(&'static self, reg: Arc<NeverDieEntry>) {
        let key = Self::in_flight_key(&reg);
        match &reg.context {
            ExecutionContext::Blocking(refresh) => {
                if self.blocking_in_flight.contains_key(&key) {
                    return;
                }
                let refresh = refresh.clone();
                let reg = reg.clone();
                let handle = thread::spawn(move || run_blocking_refresh(&reg, &refresh));
                self.blocking_in_flight.insert(key, handle);
            }
            #[cfg(feature = "async")]
            ExecutionContext::Cooperative { refresh, scheduler } => {
                if self.cooperative_in_flight.contains_key(&key) {
                    return;
                }
                if !scheduler.is_running() {
                    tracing::debug!(
                        function_id = %reg.function_id,
                        fingerprint = %reg.fingerprint,
                        "cooperative scheduler not running, skipping this cycle"
                    );
                    return;
                }
                let refresh = refresh.clone();
                let reg2 = reg.clone();
                let job = Box::pin(async move {
                    run_cooperative_refresh(&reg2, &refresh).await;
                });
                match scheduler.submit(job) {
                    Ok(handle) => {
                        self.cooperative_in_flight.insert(key, handle);
                    }
                    Err(_) => {
                        tracing::debug!(
                            function_id = %reg.function_id,
                            fingerprint = %reg.fingerprint,
                            "cooperative scheduler closed mid-submit, skipping this cycle"
                        );
                    }
                }
            }
        }
    }
}

impl Default for NeverDieScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn run_blocking_refresh(reg: &NeverDieEntry, refresh: &entry::BlockingRefresh) {
    let engine = Engine::global();
    let lock = engine.blocking_locks.get_or_create(&reg.function_id, &reg.fingerprint);
    let _guard = lock_recovering(&lock);
    match refresh() {
        Ok(value) => {
            engine.store.set(&reg.function_id, &reg.fingerprint, value, None);
            reg.reset();
        }
        Err(error) => {
            tracing::debug!(
                function_id = %reg.function_id,
                fingerprint = %reg.fingerprint,
                error = %error,
                "never-die refresh failed"
            );
            reg.revive();
        }
    }
}

#[cfg(feature = "async")]
async fn run_cooperative_refresh(reg: &NeverDieEntry, refresh: &entry::CooperativeRefresh) {
    let engine = Engine::global();
    let lock = engine
        .cooperative_locks
        .get_or_create(&reg.function_id, &reg.fingerprint);
    let _guard = lock.lock().await;
    match refresh().await {
        Ok(value) => {
            engine.store.set(&reg.function_id, &reg.fingerprint, value, None);
            reg.reset();
        }
        Err(error) => {
            tracing::debug!(
                function_id = %reg.function_id,
                fingerprint = %reg.fingerprint,
                error = %error,
                "never-die refresh failed"
            );
            reg.revive();
        }
    }
}
