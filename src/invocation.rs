use std::sync::Arc;

use crate::key::ArgValue;

/// The positional and keyword arguments of one call, in the dynamic
/// [`ArgValue`] form the core operates on.
///
/// Cheap to clone (backed by `Arc` slices) so a never-die registration can
/// hold its own copy for replaying the call later on a background thread,
/// independent of the original caller's stack frame.
#[derive(Clone)]
pub struct Invocation {
    args: Arc<[ArgValue]>,
    kwargs: Arc<[(String, ArgValue)]>,
}

impl Invocation {
    #[must_use]
    pub fn new(args: Vec<ArgValue>, kwargs: Vec<(String, ArgValue)>) -> Self {
        Self {
            args: Arc::from(args),
            kwargs: Arc::from(kwargs),
        }
    }

    #[must_use]
    pub fn args(&self) -> &[ArgValue] {
        &self.args
    }

    #[must_use]
    pub fn kwargs(&self) -> &[(String, ArgValue)] {
        &self.kwargs
    }
}

/// Recognize and strip the one keyword the engine reserves for itself:
/// `skip_cache`. Returns `(skip_cache, remaining_kwargs)`. A non-bool value
/// under that name is left in place and treated as `false` — it is the
/// host's job to validate keyword types before they reach this engine.
pub(crate) fn extract_skip_cache(
    mut kwargs: Vec<(String, ArgValue)>,
) -> (bool, Vec<(String, ArgValue)>) {
    if let Some(pos) = kwargs.iter().position(|(name, _)| name == "skip_cache") {
        if matches!(kwargs.get(pos), Some((_, ArgValue::Bool(_)))) {
            let (_, value) = kwargs.remove(pos);
            if let ArgValue::Bool(flag) = value {
                return (flag, kwargs);
            }
        }
    }
    (false, kwargs)
}
