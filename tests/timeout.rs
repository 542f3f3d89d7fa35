#![cfg(feature = "timer")]

use std::time::Duration;

use async_when::future::{self, Source};
use async_when::task;

#[test]
fn should_timeout() {
    task::block_on(async {
        let never = future::when(vec![
            Source::<i32, ()>::value(1),
            Source::initiator(|_, _| {}),
        ])
        .unwrap();

        let res = future::timeout(Duration::from_millis(100), never).await;
        assert!(res.is_err());
        assert_eq!(res.unwrap_err().to_string(), "future has timed out");
    })
}

#[test]
fn should_not_timeout() {
    task::block_on(async {
        let done = future::when(vec![Source::<i32, ()>::value(0)]).unwrap();
        let res = future::timeout(Duration::from_millis(100), done).await;
        assert_eq!(res, Ok(Ok(())));
    })
}

#[test]
fn timeout_future_many() {
    task::block_on(async {
        let futures = (0..100)
            .map(|i| {
                let delayed = future::wait(Duration::from_millis(i), Ok::<_, ()>(i));
                future::timeout(Duration::from_millis(i * 10 + 100), delayed)
            })
            .collect::<Vec<_>>();

        for (i, future) in futures.into_iter().enumerate() {
            assert_eq!(future.await, Ok(Ok(i as u64)));
        }
    });
}
