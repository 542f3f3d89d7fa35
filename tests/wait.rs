#![cfg(feature = "timer")]

use std::time::{Duration, Instant};

use async_when::future::{self, Source};
use async_when::task;

#[test]
fn resolves_after_delay() {
    task::block_on(async {
        let start = Instant::now();
        let done = future::wait(Duration::from_millis(50), Ok::<_, ()>("done"));

        assert_eq!(done.await, Ok("done"));
        assert!(start.elapsed() >= Duration::from_millis(50));
    })
}

#[test]
fn rejects_after_delay() {
    task::block_on(async {
        let start = Instant::now();
        let failed = future::wait(Duration::from_millis(20), Err::<(), _>("expired"));

        assert_eq!(failed.await, Err("expired"));
        assert!(start.elapsed() >= Duration::from_millis(20));
    })
}

#[test]
fn aggregation_waits_for_slowest() {
    task::block_on(async {
        let start = Instant::now();
        let sources = (1..=5u64)
            .map(|i| Source::from(future::wait(Duration::from_millis(i * 10), Ok::<_, ()>(i))))
            .collect::<Vec<_>>();

        let total = future::when_with(sources, |results, _| {
            Ok::<_, ()>(Source::value(results.into_iter().flatten().sum::<u64>()))
        })
        .unwrap();

        assert_eq!(total.await, Ok(15));
        assert!(start.elapsed() >= Duration::from_millis(50));
    })
}
