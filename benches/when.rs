#![feature(test)]

extern crate test;

use async_when::future::{self, Source};
use async_when::task;
use test::Bencher;

#[bench]
fn when_ready_values(b: &mut Bencher) {
    b.iter(|| {
        task::block_on(async {
            let sources = (0..1000).map(|i| Source::<usize, ()>::value(i));
            future::when(sources).unwrap().await
        })
    });
}

#[bench]
fn when_with_initiators(b: &mut Bencher) {
    b.iter(|| {
        task::block_on(async {
            let sources = (0..1000).map(|i| {
                Source::<usize, usize>::initiator(move |resolve, reject| {
                    if i % 2 == 0 {
                        resolve.resolve(i);
                    } else {
                        reject.reject(i);
                    }
                })
            });

            future::when_with(sources, |results, errors| {
                Ok::<_, ()>(Source::value(results.len() + errors.len()))
            })
            .unwrap()
            .await
        })
    });
}
