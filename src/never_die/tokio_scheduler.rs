use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;

use super::scheduler::{CooperativeScheduler, SchedulerClosed, TaskHandle};

/// [`CooperativeScheduler`] backed by a captured [`tokio::runtime::Handle`].
///
/// `tokio::runtime::Handle` has no public "is this runtime still alive"
/// query, so liveness is inferred from whether a submission panics — the
/// documented failure mode of spawning onto a shut-down runtime.
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Capture the handle of the runtime driving the current async task.
    /// Call this from inside the cooperative memoizer's call path, so the
    /// registration's scheduler always reflects the executor that owns the
    /// call, not whichever runtime happens to be ambient elsewhere.
    #[must_use]
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl CooperativeScheduler for TokioScheduler {
    fn is_running(&self) -> bool {
        // No cheap liveness query exists on `Handle`; `submit`'s catch_unwind
        // is the authoritative check. Always optimistic here.
        true
    }

    fn submit(
        &self,
        job: Pin<Box<dyn Future<Output = ()> + Send>>,
    ) -> Result<Box<dyn TaskHandle>, SchedulerClosed> {
        catch_unwind(AssertUnwindSafe(|| self.handle.spawn(job)))
            .map(|join| Box::new(TokioTaskHandle(join)) as Box<dyn TaskHandle>)
            .map_err(|_| SchedulerClosed)
    }
}

struct TokioTaskHandle(tokio::task::JoinHandle<()>);

impl TaskHandle for TokioTaskHandle {
    fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}
