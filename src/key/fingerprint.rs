use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::KeyError;
use crate::key::signature::Signature;
use crate::key::value::ArgValue;

/// How a call's arguments are turned into a cache key.
///
/// The two strategies are mutually exclusive by construction: a
/// [`MemoizeConfig`](crate::memoize::MemoizeConfig) accepts either a list of
/// field names to drop from the default, signature-driven key, or a
/// `key_function` that replaces it outright, never both.
pub enum KeyStrategy {
    /// Bind the call against the declared signature and fold every bound
    /// argument except the named ones into the key.
    Default { ignore_fields: Vec<&'static str> },
    /// Call the given function with the raw positional/keyword arguments
    /// and use its return value as the key. The returned value must be
    /// hashable (see [`ArgValue::is_hashable`]).
    KeyFunction(Box<dyn Fn(&[ArgValue], &[(String, ArgValue)]) -> ArgValue + Send + Sync>),
}

/// Derive a stable cache key string for one call.
pub fn make_key(
    signature: &Signature,
    strategy: &KeyStrategy,
    args: &[ArgValue],
    kwargs: &[(String, ArgValue)],
) -> Result<String, KeyError> {
    let key_value = match strategy {
        KeyStrategy::KeyFunction(f) => {
            let value = f(args, kwargs);
            if !value.is_hashable() {
                return Err(KeyError::BadKeyFunction);
            }
            value
        }
        KeyStrategy::Default { ignore_fields } => {
            let bound = signature.bind_partial(args, kwargs)?;
            let items = bound
                .into_iter()
                .filter(|(name, _)| match name {
                    Some(n) => !ignore_fields.contains(&n.as_str()),
                    None => true,
                })
                .map(|(name, value)| match name {
                    Some(n) => ArgValue::Tuple(vec![ArgValue::Str(n), value]),
                    None => value,
                })
                .collect();
            ArgValue::Tuple(items)
        }
    };
    Ok(hash_to_hex(&key_value))
}

fn hash_to_hex(value: &ArgValue) -> String {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
