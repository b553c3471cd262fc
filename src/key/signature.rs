use std::collections::VecDeque;

use crate::error::BindError;
use crate::key::value::ArgValue;

/// The role a declared parameter plays when binding a call's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// An ordinary named parameter, fillable positionally or by keyword.
    Ordinary,
    /// Collects any positional arguments left over after ordinary
    /// parameters are filled (at most one per signature).
    VarPositional,
    /// Collects any keyword arguments left over after ordinary parameters
    /// are filled (at most one per signature).
    VarKeyword,
}

/// One parameter of a declared [`Signature`].
#[derive(Debug, Clone)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: Option<ArgValue>,
}

impl Param {
    #[must_use]
    pub fn ordinary(name: &'static str, default: Option<ArgValue>) -> Self {
        Self {
            name,
            kind: ParamKind::Ordinary,
            default,
        }
    }

    #[must_use]
    pub fn var_positional(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::VarPositional,
            default: None,
        }
    }

    #[must_use]
    pub fn var_keyword(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::VarKeyword,
            default: None,
        }
    }
}

/// A bound argument: `Some(name)` for a named parameter, `None` for an entry
/// collected by a variadic positional parameter.
pub type BoundArg = (Option<String>, ArgValue);

/// A callable's declared parameter list, used to turn a call's positional
/// and keyword arguments into a canonical, ordered sequence for
/// fingerprinting.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub params: Vec<Param>,
}

impl Signature {
    #[must_use]
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    /// Bind `args`/`kwargs` against the declared parameters, applying
    /// declared defaults for anything omitted. A parameter that is neither
    /// supplied nor defaulted is simply absent from the result — this is a
    /// *partial* bind, not a completeness check; the wrapped callable (not
    /// this engine) is responsible for rejecting a truly incomplete call.
    ///
    /// Returns an error only for call shapes the signature cannot accept at
    /// all: more positional arguments than it declares parameters for (with
    /// no `VarPositional` to soak up the rest), or a keyword argument that
    /// names no declared parameter (with no `VarKeyword` to soak up the
    /// rest).
    pub fn bind_partial(
        &self,
        args: &[ArgValue],
        kwargs: &[(String, ArgValue)],
    ) -> Result<Vec<BoundArg>, BindError> {
        let mut remaining_args: VecDeque<ArgValue> = args.iter().cloned().collect();
        let mut remaining_kwargs: Vec<(String, ArgValue)> = kwargs.to_vec();
        let mut bound = Vec::with_capacity(self.params.len());

        for param in &self.params {
            match param.kind {
                ParamKind::Ordinary => {
                    if let Some(value) = remaining_args.pop_front() {
                        bound.push((Some(param.name.to_owned()), value));
                    } else if let Some(pos) = remaining_kwargs
                        .iter()
                        .position(|(name, _)| name == param.name)
                    {
                        let (_, value) = remaining_kwargs.remove(pos);
                        bound.push((Some(param.name.to_owned()), value));
                    } else if let Some(default) = &param.default {
                        bound.push((Some(param.name.to_owned()), default.clone()));
                    }
                    // else: omitted, no default — left unbound, not an error.
                }
                ParamKind::VarPositional => {
                    for value in remaining_args.drain(..) {
                        bound.push((None, value));
                    }
                }
                ParamKind::VarKeyword => {
                    for (name, value) in remaining_kwargs.drain(..) {
                        bound.push((Some(name), value));
                    }
                }
            }
        }

        if !remaining_args.is_empty() {
            return Err(BindError::TooManyPositionalArgs {
                max: args.len() - remaining_args.len(),
                got: args.len(),
            });
        }
        if let Some((name, _)) = remaining_kwargs.into_iter().next() {
            return Err(BindError::UnexpectedKeyword { name });
        }

        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> Signature {
        Signature::new(vec![
            Param::ordinary("a", None),
            Param::ordinary("b", Some(ArgValue::Int(9))),
            Param::var_positional("rest"),
            Param::var_keyword("opts"),
        ])
    }

    #[test]
    fn positional_only_call() {
        let bound = sig()
            .bind_partial(&[ArgValue::Int(1), ArgValue::Int(2), ArgValue::Int(3)], &[])
            .unwrap();
        assert_eq!(
            bound,
            vec![
                (Some("a".into()), ArgValue::Int(1)),
                (Some("b".into()), ArgValue::Int(2)),
                (None, ArgValue::Int(3)),
            ]
        );
    }

    #[test]
    fn keyword_fills_ordinary_and_default_applies() {
        let bound = sig()
            .bind_partial(&[], &[("a".into(), ArgValue::Int(7))])
            .unwrap();
        assert_eq!(
            bound,
            vec![
                (Some("a".into()), ArgValue::Int(7)),
                (Some("b".into()), ArgValue::Int(9)),
            ]
        );
    }

    #[test]
    fn extra_keywords_collected_by_var_keyword() {
        let bound = sig()
            .bind_partial(
                &[ArgValue::Int(1), ArgValue::Int(2)],
                &[("extra".into(), ArgValue::Bool(true))],
            )
            .unwrap();
        assert_eq!(
            bound,
            vec![
                (Some("a".into()), ArgValue::Int(1)),
                (Some("b".into()), ArgValue::Int(2)),
                (Some("extra".into()), ArgValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn unexpected_keyword_without_var_keyword_errors() {
        let narrow = Signature::new(vec![Param::ordinary("a", None)]);
        let err = narrow
            .bind_partial(&[], &[("bogus".into(), ArgValue::Int(1))])
            .unwrap_err();
        assert!(matches!(err, BindError::UnexpectedKeyword { name } if name == "bogus"));
    }

    #[test]
    fn too_many_positional_without_var_positional_errors() {
        let narrow = Signature::new(vec![Param::ordinary("a", None)]);
        let err = narrow
            .bind_partial(&[ArgValue::Int(1), ArgValue::Int(2)], &[])
            .unwrap_err();
        assert!(matches!(err, BindError::TooManyPositionalArgs { .. }));
    }

    #[test]
    fn omitted_without_default_is_simply_absent() {
        let narrow = Signature::new(vec![Param::ordinary("a", None)]);
        let bound = narrow.bind_partial(&[], &[]).unwrap();
        assert!(bound.is_empty());
    }
}
