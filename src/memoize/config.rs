use std::time::Duration;

use crate::error::ConfigError;
use crate::function_id::FunctionId;
use crate::invocation::Invocation;
use crate::key::{ArgValue, KeyStrategy, Signature};

/// Default entry lifetime when a config doesn't call [`MemoizeConfig::ttl`].
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Fluent builder for one memoized function's settings. Validated eagerly
/// when a call to [`MemoizeConfig::build_blocking`] or
/// [`MemoizeConfig::build_cooperative`] constructs the memoizer — there is
/// no later point at which a bad combination of settings could surface.
pub struct MemoizeConfig {
    pub(crate) function_id: FunctionId,
    pub(crate) signature: Signature,
    pub(crate) ttl: Duration,
    pub(crate) never_die: bool,
    ignore_fields: Vec<&'static str>,
    key_function: Option<Box<dyn Fn(&[ArgValue], &[(String, ArgValue)]) -> ArgValue + Send + Sync>>,
}

impl MemoizeConfig {
    #[must_use]
    pub fn new(function_id: FunctionId, signature: Signature) -> Self {
        Self {
            function_id,
            signature,
            ttl: DEFAULT_TTL,
            never_die: false,
            ignore_fields: Vec::new(),
            key_function: None,
        }
    }

    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn never_die(mut self, never_die: bool) -> Self {
        self.never_die = never_die;
        self
    }

    #[must_use]
    pub fn ignore_fields(mut self, fields: Vec<&'static str>) -> Self {
        self.ignore_fields = fields;
        self
    }

    #[must_use]
    pub fn key_function(
        mut self,
        f: impl Fn(&[ArgValue], &[(String, ArgValue)]) -> ArgValue + Send + Sync + 'static,
    ) -> Self {
        self.key_function = Some(Box::new(f));
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.ignore_fields.is_empty() && self.key_function.is_some() {
            return Err(ConfigError::BadConfig {
                function_id: self.function_id.clone(),
                reason: "ignore_fields and key_function are mutually exclusive",
            });
        }
        if self.ttl.is_zero() {
            return Err(ConfigError::BadConfig {
                function_id: self.function_id.clone(),
                reason: "ttl must be greater than zero",
            });
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> Result<(FunctionId, Signature, Duration, bool, KeyStrategy), ConfigError> {
        self.validate()?;
        let strategy = match self.key_function {
            Some(f) => KeyStrategy::KeyFunction(f),
            None => KeyStrategy::Default {
                ignore_fields: self.ignore_fields,
            },
        };
        Ok((self.function_id, self.signature, self.ttl, self.never_die, strategy))
    }
}

/// Shared by both memoizer flavors: the user-supplied result of a
/// single-flight recomputation, before type erasure for storage.
pub(crate) type RawResult<V, E> = Result<V, E>;

pub(crate) type BlockingFn<V, E> =
    dyn Fn(&Invocation) -> RawResult<V, E> + Send + Sync;
