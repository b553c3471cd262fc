use std::any::Any;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::function_id::FunctionId;
use crate::lock::lock_recovering;

use super::scheduler::CooperativeScheduler;

pub(crate) type BlockingRefresh =
    Arc<dyn Fn() -> Result<Arc<dyn Any + Send + Sync>, String> + Send + Sync>;

#[cfg(feature = "async")]
pub(crate) type CooperativeRefresh = Arc<
    dyn Fn() -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<Arc<dyn Any + Send + Sync>, String>> + Send>,
        > + Send
        + Sync,
>;

/// Which world a registration's refresh runs in, captured once at first
/// registration and never changed afterward.
pub enum ExecutionContext {
    Blocking(BlockingRefresh),
    #[cfg(feature = "async")]
    Cooperative {
        refresh: CooperativeRefresh,
        scheduler: Arc<dyn CooperativeScheduler>,
    },
}

struct BackOff {
    multiplier: f64,
    next_refresh_at: Instant,
}

const BACK_OFF_GROWTH: f64 = 1.25;
const BACK_OFF_CAP: f64 = 10.0;

/// One never-die function/argument-shape's standing registration. Equality
/// is over `(function_id, fingerprint)`: repeated calls with the same
/// arguments register once and share this entry.
pub struct NeverDieEntry {
    pub function_id: FunctionId,
    pub fingerprint: String,
    pub ttl: Duration,
    pub context: ExecutionContext,
    back_off: Mutex<BackOff>,
}

impl NeverDieEntry {
    pub(crate) fn new(
        function_id: FunctionId,
        fingerprint: String,
        ttl: Duration,
        context: ExecutionContext,
    ) -> Self {
        Self {
            function_id,
            fingerprint,
            ttl,
            context,
            back_off: Mutex::new(BackOff {
                multiplier: 1.0,
                next_refresh_at: Instant::now() + ttl,
            }),
        }
    }

    pub(crate) fn is_due(&self) -> bool {
        Instant::now() >= lock_recovering(&self.back_off).next_refresh_at
    }

    /// A refresh succeeded: reset back-off and schedule the next attempt
    /// one plain `ttl` out.
    pub(crate) fn reset(&self) {
        let mut state = lock_recovering(&self.back_off);
        state.multiplier = 1.0;
        state.next_refresh_at = Instant::now() + self.ttl;
    }

    /// A refresh failed: grow the back-off multiplier (capped) and push the
    /// next attempt further out, so a persistently-failing refresh doesn't
    /// hammer the source at the bare `ttl` cadence.
    pub(crate) fn revive(&self) {
        let mut state = lock_recovering(&self.back_off);
        state.multiplier = (state.multiplier * BACK_OFF_GROWTH).min(BACK_OFF_CAP);
        state.next_refresh_at = Instant::now() + self.ttl.mul_f64(state.multiplier);
    }
}
