use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kasheless::function_id::FunctionId;
use kasheless::invocation::Invocation;
use kasheless::key::Signature;
use kasheless::memoize::{memoize, MemoizeConfig};

#[derive(Debug)]
struct UpstreamError(String);

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UpstreamError {}

// S5: never-die refresh keeps the entry moving forward in the background
// after a single priming call.
#[test]
fn s5_never_die_refreshes_in_background() {
    let counter = Arc::new(AtomicI64::new(0));
    let config = MemoizeConfig::new(FunctionId::anonymous(), Signature::default())
        .ttl(Duration::from_millis(100))
        .never_die(true);
    let counter_for_fn = counter.clone();
    let memo = memoize(config, move |_: &Invocation| {
        Ok::<_, std::convert::Infallible>(counter_for_fn.fetch_add(1, Ordering::SeqCst))
    })
    .unwrap();

    assert_eq!(memo.call(vec![], vec![]).unwrap(), 0);

    thread::sleep(Duration::from_millis(400));

    let last = memo.call(vec![], vec![]).unwrap();
    assert!(last >= 2, "expected at least 2 background refreshes, saw {last}");
    assert!(counter.load(Ordering::SeqCst) >= 3);
}

// S6: never-die resilience - once the wrapped callable starts failing, the
// last successful value keeps being served, and retries keep happening
// (just at decreasing frequency thanks to back-off) rather than stopping.
#[test]
fn s6_never_die_serves_stale_value_through_failures() {
    let counter = Arc::new(AtomicI64::new(0));
    let config = MemoizeConfig::new(FunctionId::anonymous(), Signature::default())
        .ttl(Duration::from_millis(100))
        .never_die(true);
    let counter_for_fn = counter.clone();
    let memo = memoize(config, move |_: &Invocation| {
        let value = counter_for_fn.fetch_add(1, Ordering::SeqCst);
        if value > 2 {
            Err(UpstreamError("upstream unavailable".to_owned()))
        } else {
            Ok(value)
        }
    })
    .unwrap();

    assert_eq!(memo.call(vec![], vec![]).unwrap(), 0);

    thread::sleep(Duration::from_millis(400));

    let served = memo.call(vec![], vec![]).unwrap();
    assert_eq!(served, 2, "last successful value must still be served");
    assert!(
        counter.load(Ordering::SeqCst) > 2,
        "failed refresh attempts must still have been made"
    );
}

// Side-by-side: a regular (non-never-die) entry and a never-die entry with
// the same TTL, in the same test. Nothing ever calls the regular memoizer a
// second time, so its callable's invocation count sits at 1 forever once its
// TTL has passed; the never-die memoizer's supervisor keeps refreshing its
// entry in the background over the same wait window, so its count grows.
#[test]
fn never_die_vs_regular_call_count_over_the_same_wait_window() {
    let regular_counter = Arc::new(AtomicI64::new(0));
    let regular_config =
        MemoizeConfig::new(FunctionId::anonymous(), Signature::default()).ttl(Duration::from_millis(100));
    let regular_counter_for_fn = regular_counter.clone();
    let regular_memo = memoize(regular_config, move |_: &Invocation| {
        Ok::<_, std::convert::Infallible>(regular_counter_for_fn.fetch_add(1, Ordering::SeqCst))
    })
    .unwrap();

    let never_die_counter = Arc::new(AtomicI64::new(0));
    let never_die_config = MemoizeConfig::new(FunctionId::anonymous(), Signature::default())
        .ttl(Duration::from_millis(100))
        .never_die(true);
    let never_die_counter_for_fn = never_die_counter.clone();
    let never_die_memo = memoize(never_die_config, move |_: &Invocation| {
        Ok::<_, std::convert::Infallible>(never_die_counter_for_fn.fetch_add(1, Ordering::SeqCst))
    })
    .unwrap();

    regular_memo.call(vec![], vec![]).unwrap();
    never_die_memo.call(vec![], vec![]).unwrap();

    thread::sleep(Duration::from_millis(400));

    assert_eq!(
        regular_counter.load(Ordering::SeqCst),
        1,
        "regular entry must not be touched again without an explicit call"
    );
    assert!(
        never_die_counter.load(Ordering::SeqCst) > 1,
        "never-die entry must keep being refreshed by the supervisor"
    );
}

// Two never-die registrations for the same (function_id, fingerprint) fold
// into one: registering twice does not start a second supervisor entry or
// reset back-off.
#[test]
fn repeated_registration_is_idempotent() {
    let counter = Arc::new(AtomicI64::new(0));
    let config = MemoizeConfig::new(FunctionId::anonymous(), Signature::default())
        .ttl(Duration::from_millis(100))
        .never_die(true);
    let counter_for_fn = counter.clone();
    let memo = memoize(config, move |_: &Invocation| {
        Ok::<_, std::convert::Infallible>(counter_for_fn.fetch_add(1, Ordering::SeqCst))
    })
    .unwrap();

    for _ in 0..5 {
        memo.call(vec![], vec![]).unwrap();
    }
    // Five rapid calls within the TTL should still have registered once
    // and invoked the callable once for priming.
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
