use async_when::future::{self, Promise, Source};
use async_when::task;

#[test]
fn smoke() {
    let res = task::block_on(async { 1 + 2 });
    assert_eq!(res, 3);
}

#[test]
#[should_panic = "boom"]
fn panic() {
    task::block_on(async {
        // This panic should get propagated into the parent thread.
        panic!("boom");
    });
}

#[test]
fn nested_block_on() {
    let x = task::block_on(async {
        let a = task::block_on(async { task::block_on(Promise::<i32, ()>::resolved(3)) });
        let b = task::block_on(future::settled(Ok::<_, ()>(2)));
        let c = task::block_on(async {
            future::when_with(vec![Source::<i32, ()>::value(1)], |results, _| {
                Ok::<_, ()>(Source::value(results[0].unwrap()))
            })
            .unwrap()
            .await
        });
        a.unwrap() + b.unwrap() + c.unwrap()
    });

    assert_eq!(x, 3 + 2 + 1);
}
