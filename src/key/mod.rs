//! Fingerprinting: turning a call's arguments into a stable cache key.

mod fingerprint;
mod signature;
mod value;

pub use fingerprint::{make_key, KeyStrategy};
pub use signature::{BoundArg, Param, ParamKind, Signature};
pub use value::ArgValue;
