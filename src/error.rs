use crate::function_id::FunctionId;

/// A [`MemoizeConfig`](crate::memoize::MemoizeConfig) was built with an
/// invalid combination of settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("memoize config for `{function_id}` is invalid: {reason}")]
    BadConfig {
        function_id: FunctionId,
        reason: &'static str,
    },
}

/// Failure to derive a cache key for a single call.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Binding the call's positional/keyword arguments against the
    /// declared signature failed.
    #[error("failed to bind call arguments: {0}")]
    Bind(#[from] BindError),

    /// `key_function` returned a value containing a list or map, which
    /// cannot be used as a cache key.
    #[error("key_function returned a value that is not hashable")]
    BadKeyFunction,
}

/// Binding a call's arguments against a declared [`Signature`](crate::key::Signature) failed.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("too many positional arguments: signature accepts at most {max}, got {got}")]
    TooManyPositionalArgs { max: usize, got: usize },

    #[error("unexpected keyword argument `{name}`")]
    UnexpectedKeyword { name: String },
}

/// The outcome of a single call through a memoizer: either the key derivation
/// failed before the wrapped function ran, or the wrapped function ran and
/// returned its own error.
#[derive(Debug, thiserror::Error)]
pub enum CallError<E> {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    User(E),
}
