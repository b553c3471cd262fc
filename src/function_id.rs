use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stable identity of a decorated callable.
///
/// Mirrors the source system's `"<module>.<qualified-name>"` string: two
/// [`FunctionId`]s with the same label are the same cache namespace, and
/// identity is never derived from a closure's address. Hosts that can supply
/// a stable qualified name should use [`FunctionId::named`]; hosts that
/// cannot (anonymous closures, one-off call sites in tests) should use
/// [`FunctionId::anonymous`], which hands out a process-wide unique label
/// once and keeps it for the lifetime of the value — the "counter assigned
/// at decoration time" alternative called out in the design notes.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct FunctionId(Arc<str>);

static ANONYMOUS_COUNTER: AtomicU64 = AtomicU64::new(0);

impl FunctionId {
    /// Build a function id from a stable, caller-supplied label, e.g.
    /// `concat!(module_path!(), "::fib")`.
    pub fn named(label: impl Into<Arc<str>>) -> Self {
        Self(label.into())
    }

    /// Build a function id with a fresh, process-wide unique label. Useful
    /// when the host has no qualified name to offer (ad-hoc closures).
    #[must_use]
    pub fn anonymous() -> Self {
        let ordinal = ANONYMOUS_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(Arc::from(format!("<anonymous#{ordinal}>")))
    }

    pub(crate) fn as_arc_str(&self) -> Arc<str> {
        self.0.clone()
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionId({:?})", self.0)
    }
}
