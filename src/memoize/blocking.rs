use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::CallError;
use crate::function_id::FunctionId;
use crate::invocation::{extract_skip_cache, Invocation};
use crate::key::{make_key, ArgValue, KeyStrategy, Signature};
use crate::lock::lock_recovering;
use crate::memoize::config::MemoizeConfig;
use crate::never_die::ExecutionContext;

/// A memoized callable for the blocking/OS-thread world: `call` blocks the
/// calling thread for as long as it takes to either hit the cache or run
/// the wrapped function once.
pub struct BlockingMemoizer<F, V, E> {
    function_id: FunctionId,
    signature: Signature,
    key_strategy: KeyStrategy,
    ttl: Duration,
    never_die: bool,
    func: Arc<F>,
    _marker: std::marker::PhantomData<fn() -> Result<V, E>>,
}

impl<F, V, E> BlockingMemoizer<F, V, E>
where
    F: Fn(&Invocation) -> Result<V, E> + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    /// Build a memoizer from a validated config and the callable it wraps.
    pub fn new(config: MemoizeConfig, func: F) -> Result<Self, crate::error::ConfigError> {
        let (function_id, signature, ttl, never_die, key_strategy) = config.into_parts()?;
        Ok(Self {
            function_id,
            signature,
            key_strategy,
            ttl,
            never_die,
            func: Arc::new(func),
            _marker: std::marker::PhantomData,
        })
    }

    #[must_use]
    pub fn function_id(&self) -> &FunctionId {
        &self.function_id
    }

    /// Invoke the memoized callable with `args`/`kwargs`. Recognizes and
    /// strips a `skip_cache` keyword entry before the callable ever sees
    /// the argument list.
    pub fn call(
        &self,
        args: Vec<ArgValue>,
        kwargs: Vec<(String, ArgValue)>,
    ) -> Result<V, CallError<E>> {
        let (skip_cache, kwargs) = extract_skip_cache(kwargs);
        let fingerprint = make_key(&self.signature, &self.key_strategy, &args, &kwargs)?;
        let engine = Engine::global();

        if self.never_die {
            self.register_never_die(engine, &fingerprint, &args, &kwargs);
        }

        if let Some(entry) = engine.store.get(&self.function_id, &fingerprint, skip_cache) {
            if let Ok(value) = entry.value.clone().downcast::<V>() {
                return Ok((*value).clone());
            }
        }

        let lock = engine.blocking_locks.get_or_create(&self.function_id, &fingerprint);
        let _guard = lock_recovering(&lock);

        // Re-check: another caller may have filled the entry while we waited.
        if !skip_cache {
            if let Some(entry) = engine.store.get(&self.function_id, &fingerprint, false) {
                if let Ok(value) = entry.value.clone().downcast::<V>() {
                    return Ok((*value).clone());
                }
            }
        }

        let invocation = Invocation::new(args, kwargs);
        let result = (self.func)(&invocation).map_err(CallError::User)?;
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(result.clone());
        engine.store.set(&self.function_id, &fingerprint, erased, Some(self.ttl));
        Ok(result)
    }

    fn register_never_die(
        &self,
        engine: &'static Engine,
        fingerprint: &str,
        args: &[ArgValue],
        kwargs: &[(String, ArgValue)],
    ) {
        let func = self.func.clone();
        let invocation = Invocation::new(args.to_vec(), kwargs.to_vec());
        let refresh = Arc::new(move || -> Result<Arc<dyn Any + Send + Sync>, String> {
            func(&invocation)
                .map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
                .map_err(|e| e.to_string())
        });
        engine.never_die.register(
            self.function_id.clone(),
            fingerprint.to_owned(),
            self.ttl,
            ExecutionContext::Blocking(refresh),
        );
    }
}
