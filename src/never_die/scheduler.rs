use std::pin::Pin;
use std::future::Future;

/// A host-provided handle onto a cooperative (single-threaded/async)
/// executor, captured by a never-die registration at the moment it first
/// registers from the cooperative world.
///
/// This is the cross-thread submit primitive the supervisor thread uses to
/// push a refresh onto the executor that actually owns the call's original
/// task — the supervisor itself never runs cooperative tasks directly.
pub trait CooperativeScheduler: Send + Sync {
    /// Best-effort liveness probe. `submit` may still fail even when this
    /// returns `true` (the executor can shut down between the check and the
    /// submission); a caller must treat `Err(SchedulerClosed)` from `submit`
    /// as authoritative and this as only a hint for skipping obviously-dead
    /// schedulers early.
    fn is_running(&self) -> bool;

    /// Hand a unit of work to the executor, running it to completion
    /// somewhere on that executor rather than on the calling thread.
    /// Returns a handle the caller can poll for completion, or
    /// `SchedulerClosed` if the executor is already gone.
    fn submit(
        &self,
        job: Pin<Box<dyn Future<Output = ()> + Send>>,
    ) -> Result<Box<dyn TaskHandle>, SchedulerClosed>;
}

/// Abstraction over a spawned task's completion state, so the supervisor
/// doesn't need to know which concrete executor produced it.
pub trait TaskHandle: Send {
    fn is_finished(&self) -> bool;
}

/// Returned when a cooperative scheduler can no longer accept work —
/// its executor has shut down. A never-die refresh that hits this is
/// skipped for the current cycle and logged at debug level; it is retried
/// on the next due cycle rather than treated as a permanent failure.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("cooperative scheduler is closed")]
pub struct SchedulerClosed;
