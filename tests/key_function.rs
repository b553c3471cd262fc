use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kasheless::function_id::FunctionId;
use kasheless::invocation::Invocation;
use kasheless::key::{ArgValue, Param, Signature};
use kasheless::memoize::{memoize, MemoizeConfig};

fn signature_ab() -> Signature {
    Signature::new(vec![Param::ordinary("a", None), Param::ordinary("b", None)])
}

// A key_function can read from positional args, keyword args, or a mix of
// both, and must see the same logical call regardless of which style the
// caller used.
#[test]
fn key_function_sees_positional_keyword_and_mixed_calls() {
    let counter = Arc::new(AtomicI64::new(0));
    let counter_for_fn = counter.clone();
    let config = MemoizeConfig::new(FunctionId::anonymous(), signature_ab())
        .ttl(Duration::from_secs(60))
        .key_function(|args, kwargs| {
            let first = args
                .first()
                .cloned()
                .or_else(|| kwargs.iter().find(|(n, _)| n == "a").map(|(_, v)| v.clone()))
                .unwrap_or(ArgValue::Unit);
            ArgValue::Tuple(vec![first])
        });
    let memo = memoize(config, move |_: &Invocation| {
        Ok::<_, std::convert::Infallible>(counter_for_fn.fetch_add(1, Ordering::SeqCst))
    })
    .unwrap();

    let all_positional = memo
        .call(vec![ArgValue::Int(1), ArgValue::Int(2)], vec![])
        .unwrap();
    let all_keyword = memo
        .call(
            vec![],
            vec![
                ("a".to_owned(), ArgValue::Int(1)),
                ("b".to_owned(), ArgValue::Int(2)),
            ],
        )
        .unwrap();
    let mixed = memo
        .call(vec![ArgValue::Int(1)], vec![("b".to_owned(), ArgValue::Int(2))])
        .unwrap();

    assert_eq!(all_positional, all_keyword);
    assert_eq!(all_positional, mixed);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

// ignore_fields must behave the same way no matter which call style
// supplied the ignored field's value.
#[test]
fn ignore_fields_is_consistent_across_call_styles() {
    let counter = Arc::new(AtomicI64::new(0));
    let counter_for_fn = counter.clone();
    let config = MemoizeConfig::new(FunctionId::anonymous(), signature_ab())
        .ttl(Duration::from_secs(60))
        .ignore_fields(vec!["b"]);
    let memo = memoize(config, move |_: &Invocation| {
        Ok::<_, std::convert::Infallible>(counter_for_fn.fetch_add(1, Ordering::SeqCst))
    })
    .unwrap();

    let positional = memo
        .call(vec![ArgValue::Int(1), ArgValue::Int(2)], vec![])
        .unwrap();
    let keyword_ignored_differs = memo
        .call(
            vec![],
            vec![
                ("a".to_owned(), ArgValue::Int(1)),
                ("b".to_owned(), ArgValue::Int(999)),
            ],
        )
        .unwrap();
    let mixed_ignored_differs = memo
        .call(vec![ArgValue::Int(1)], vec![("b".to_owned(), ArgValue::Int(-5))])
        .unwrap();

    assert_eq!(positional, keyword_ignored_differs);
    assert_eq!(positional, mixed_ignored_differs);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

// ignore_fields and key_function are mutually exclusive; building a config
// with both set is rejected eagerly, before any call is made.
#[test]
fn ignore_fields_and_key_function_are_mutually_exclusive() {
    let config = MemoizeConfig::new(FunctionId::anonymous(), signature_ab())
        .ttl(Duration::from_secs(60))
        .ignore_fields(vec!["b"])
        .key_function(|_, _| ArgValue::Unit);

    let err = memoize(config, |_: &Invocation| Ok::<_, std::convert::Infallible>(0)).unwrap_err();
    assert!(matches!(err, kasheless::ConfigError::BadConfig { .. }));
}
