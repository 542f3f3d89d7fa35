//! Prints the aggregation log on the standard output.

use std::time::Duration;

use async_when::future::{self, Source};
use async_when::task;

fn main() {
    femme::with_level(log::LevelFilter::Trace);

    let outcome = task::block_on(async {
        let sources = vec![
            Source::from(future::wait(Duration::from_millis(30), Ok(1))),
            Source::error("unreachable host"),
            Source::value(2),
        ];

        future::when_with(sources, |results, errors| {
            let fulfilled = results.iter().flatten().count();
            let rejected = errors.iter().flatten().count();
            log::info!("{} fulfilled, {} rejected", fulfilled, rejected);
            Ok::<_, ()>(Source::value(results.into_iter().flatten().sum::<i32>()))
        })
        .unwrap()
        .await
    });

    log::info!("sum of fulfilled slots: {:?}", outcome);
}
