//! A process-wide, single-flight function-result cache with an optional
//! "never-die" mode: entries that would normally expire instead keep
//! serving their last good value while a background supervisor recomputes
//! them, so a slow or flaky upstream never turns into a cache miss on the
//! hot path.
//!
//! ```
//! use std::time::Duration;
//!
//! use kasheless::invocation::Invocation;
//! use kasheless::key::{ArgValue, Param, Signature};
//! use kasheless::memoize::{memoize, MemoizeConfig};
//! use kasheless::function_id::FunctionId;
//!
//! fn slow_lookup(invocation: &Invocation) -> Result<i64, std::convert::Infallible> {
//!     let n = match invocation.args().first() {
//!         Some(ArgValue::Int(n)) => *n,
//!         _ => unreachable!(),
//!     };
//!     Ok(n * 2)
//! }
//!
//! let signature = Signature::new(vec![Param::ordinary("n", None)]);
//! let config = MemoizeConfig::new(FunctionId::named("demo::slow_lookup"), signature)
//!     .ttl(Duration::from_secs(30));
//! let memo = memoize(config, slow_lookup).expect("valid config");
//!
//! let first = memo.call(vec![ArgValue::Int(21)], vec![]).unwrap();
//! let second = memo.call(vec![ArgValue::Int(21)], vec![]).unwrap();
//! assert_eq!(first, second);
//! ```
//!
//! Two memoizer flavors cover the two concurrency universes a call can
//! come from:
//!
//! - [`memoize::BlockingMemoizer`] (built via [`memoize::memoize`]) for
//!   ordinary OS threads; `call` blocks the caller.
//! - [`memoize::CooperativeMemoizer`] (built via [`memoize::memoize_async`],
//!   behind the `async` feature) for single-threaded/async executors;
//!   `call` is itself `async fn` and never blocks an executor thread.
//!
//! Both share the same process-wide [`engine::Engine`]: one cache store,
//! one keyed-lock registry per concurrency universe, one never-die
//! scheduler, one sweeper. A function's identity in that shared store is a
//! [`function_id::FunctionId`] the host assigns once, not a closure's
//! runtime address — two memoizers built with the same id and the same
//! call arguments will observe each other's cached results.

pub mod engine;
pub mod error;
pub mod function_id;
pub mod invocation;
pub mod key;
pub mod lock;
pub mod memoize;
pub mod never_die;
pub mod store;

pub use error::{BindError, CallError, ConfigError, KeyError};
pub use function_id::FunctionId;
pub use invocation::Invocation;
pub use memoize::{memoize, MemoizeConfig};

#[cfg(feature = "async")]
pub use memoize::memoize_async;
