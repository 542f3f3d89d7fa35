use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_when::future::{self, Promise, Source};
use async_when::task;

#[test]
fn plain_value_fulfills() {
    task::block_on(async {
        assert_eq!(future::normalize(Source::<_, ()>::value(5)).await, Ok(5));
    })
}

#[test]
fn error_rejects() {
    task::block_on(async {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "x");
        let outcome = future::normalize(Source::<(), _>::error(err)).await;
        assert_eq!(outcome.unwrap_err().to_string(), "x");
    })
}

#[test]
fn initiator_runs_eagerly() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();

    let promise = future::normalize(Source::<_, ()>::initiator(move |resolve, _| {
        flag.store(true, Ordering::SeqCst);
        resolve.resolve("ready");
    }));

    assert!(ran.load(Ordering::SeqCst));
    assert_eq!(task::block_on(promise), Ok("ready"));
}

#[test]
fn existing_promise_is_returned_as_is() {
    task::block_on(async {
        let mut handle = None;
        let original = Promise::<i32, ()>::new(|resolve, _| handle = Some(resolve));

        let normalized = future::normalize(Source::from(original));

        // Settling the original's handle settles what `normalize` returned.
        assert!(handle.unwrap().resolve(11));
        assert_eq!(normalized.await, Ok(11));
    })
}

#[test]
fn results_convert_to_tagged_sources() {
    task::block_on(async {
        assert_eq!(future::normalize(Source::from(Ok::<_, ()>(1))).await, Ok(1));
        assert_eq!(future::normalize(Source::from(Err::<(), _>(2))).await, Err(2));
    })
}

#[test]
fn settled_delegates_to_normalize() {
    task::block_on(async {
        assert_eq!(future::settled(Ok::<_, &str>("v")).await, Ok("v"));
        assert_eq!(future::settled(Err::<&str, _>("e")).await, Err("e"));
    })
}

#[test]
fn fallible_future_becomes_a_promise() {
    task::block_on(async {
        let source = Source::from_future(async { Err::<u8, _>("from future") });
        assert_eq!(future::normalize(source).await, Err("from future"));
    })
}
