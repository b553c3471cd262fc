//! The public memoization surface: a fluent config plus two memoizer
//! flavors, one per concurrency universe a call can arrive from.

mod blocking;
mod config;
#[cfg(feature = "async")]
mod cooperative;

pub use blocking::BlockingMemoizer;
pub use config::{MemoizeConfig, DEFAULT_TTL};
#[cfg(feature = "async")]
pub use cooperative::CooperativeMemoizer;

use crate::error::ConfigError;
use crate::invocation::Invocation;

/// Wrap `func` for the blocking world: `call` runs on the caller's own
/// thread and blocks it for as long as a miss takes to fill.
pub fn memoize<F, V, E>(config: MemoizeConfig, func: F) -> Result<BlockingMemoizer<F, V, E>, ConfigError>
where
    F: Fn(&Invocation) -> Result<V, E> + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    BlockingMemoizer::new(config, func)
}

/// Wrap `func` for the cooperative world: `call` is itself `async` and
/// yields its executor thread rather than blocking it while waiting on the
/// single-flight lock.
#[cfg(feature = "async")]
pub fn memoize_async<F, Fut, V, E>(
    config: MemoizeConfig,
    func: F,
) -> Result<CooperativeMemoizer<impl Fn(Invocation) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<V, E>> + Send>> + Send + Sync + 'static, V, E>, ConfigError>
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<V, E>> + Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    CooperativeMemoizer::new(config, move |invocation| {
        Box::pin(func(invocation)) as std::pin::Pin<Box<dyn std::future::Future<Output = Result<V, E>> + Send>>
    })
}
