use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::CallError;
use crate::function_id::FunctionId;
use crate::invocation::{extract_skip_cache, Invocation};
use crate::key::{make_key, ArgValue, KeyStrategy, Signature};
use crate::memoize::config::MemoizeConfig;
use crate::never_die::{CooperativeScheduler, ExecutionContext, TokioScheduler};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A memoized callable for the cooperative/async world: `call` is itself an
/// `async fn`, and the single-flight lock it takes is a `tokio::sync::Mutex`
/// so a waiting caller yields its executor thread instead of blocking it.
pub struct CooperativeMemoizer<F, V, E> {
    function_id: FunctionId,
    signature: Signature,
    key_strategy: KeyStrategy,
    ttl: Duration,
    never_die: bool,
    func: Arc<F>,
    _marker: std::marker::PhantomData<fn() -> BoxFuture<Result<V, E>>>,
}

impl<F, V, E> CooperativeMemoizer<F, V, E>
where
    F: Fn(Invocation) -> BoxFuture<Result<V, E>> + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
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

    pub async fn call(
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

        let lock = engine
            .cooperative_locks
            .get_or_create(&self.function_id, &fingerprint);
        let _guard = lock.lock().await;

        if !skip_cache {
            if let Some(entry) = engine.store.get(&self.function_id, &fingerprint, false) {
                if let Ok(value) = entry.value.clone().downcast::<V>() {
                    return Ok((*value).clone());
                }
            }
        }

        let invocation = Invocation::new(args, kwargs);
        let result = (self.func)(invocation).await.map_err(CallError::User)?;
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
        let refresh: Arc<
            dyn Fn() -> BoxFuture<Result<Arc<dyn Any + Send + Sync>, String>> + Send + Sync,
        > = Arc::new(move || {
            let func = func.clone();
            let invocation = invocation.clone();
            Box::pin(async move {
                func(invocation)
                    .await
                    .map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
                    .map_err(|e| e.to_string())
            })
        });
        let scheduler: Arc<dyn CooperativeScheduler> = Arc::new(TokioScheduler::current());
        engine.never_die.register(
            self.function_id.clone(),
            fingerprint.to_owned(),
            self.ttl,
            ExecutionContext::Cooperative { refresh, scheduler },
        );
    }
}
