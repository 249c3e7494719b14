// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Concurrency stress scenarios for the retry engine.
//!
//! Many calls retry at once; each must see its own attempt sequence progress
//! independently, and the pool of attempt-state instances must stay bounded
//! by the peak number of concurrently retrying calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use grit::{BackoffPolicy, CancellationToken, RetryError, RetryPolicyOptions, RetryProvider};

#[derive(Debug)]
struct Flaky;

fn stress_provider(num_tries: u32) -> RetryProvider<(), Flaky> {
    let policy = BackoffPolicy::fixed(
        RetryPolicyOptions {
            num_tries,
            base_delay: Duration::ZERO,
            max_delay: None,
            use_jitter: false,
        },
        |_: &Flaky| true,
    );

    RetryProvider::builder(policy)
        .enabled(true)
        // Each call's attempt index must always equal the number of errors it
        // has accumulated; cross-call interference would break this.
        .on_retrying(|args| {
            assert_eq!(args.attempt() as usize, args.errors().len());
        })
        .build()
}

#[test]
fn concurrent_blocking_calls_do_not_share_attempt_state() {
    const THREADS: usize = 16;
    const CALLS_PER_THREAD: usize = 25;

    let provider = Arc::new(stress_provider(4));
    let exhaustions = Arc::new(AtomicU32::new(0));

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let provider = Arc::clone(&provider);
            let exhaustions = Arc::clone(&exhaustions);
            scope.spawn(move || {
                for _ in 0..CALLS_PER_THREAD {
                    let error = provider.execute(&(), || Err::<(), _>(Flaky)).unwrap_err();
                    match error {
                        RetryError::Exhausted { num_tries, errors } => {
                            assert_eq!(num_tries, 4);
                            assert_eq!(errors.len(), 4);
                            let _ = exhaustions.fetch_add(1, Ordering::SeqCst);
                        }
                        other => panic!("expected exhaustion, got {other:?}"),
                    }
                }
            });
        }
    });

    let expected = u32::try_from(THREADS * CALLS_PER_THREAD).expect("fits in u32");
    assert_eq!(exhaustions.load(Ordering::SeqCst), expected);
    assert!(provider.pool_size() <= THREADS);
    assert!(provider.pool_size() >= 1);
}

#[test]
fn mixed_outcomes_under_contention() {
    const THREADS: usize = 8;

    let provider = Arc::new(stress_provider(6));

    thread::scope(|scope| {
        for worker in 0..THREADS {
            let provider = Arc::clone(&provider);
            scope.spawn(move || {
                for call in 0..50usize {
                    // Even calls succeed after a couple of failures, odd
                    // calls exhaust the budget.
                    let failures = if (worker + call) % 2 == 0 { 2 } else { usize::MAX };
                    let seen = AtomicU32::new(0);
                    let result = provider.execute(&(), || {
                        let n = seen.fetch_add(1, Ordering::SeqCst) as usize + 1;
                        if n <= failures { Err(Flaky) } else { Ok(n) }
                    });
                    match result {
                        Ok(n) => assert_eq!(n, 3),
                        Err(RetryError::Exhausted { errors, .. }) => assert_eq!(errors.len(), 6),
                        Err(other) => panic!("unexpected terminal failure: {other:?}"),
                    }
                }
            });
        }
    });

    assert!(provider.pool_size() <= THREADS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_async_calls_stay_isolated() {
    const TASKS: usize = 64;

    let provider = Arc::new(stress_provider(3));
    let token = CancellationToken::new();

    let mut handles = Vec::with_capacity(TASKS);
    for task in 0..TASKS {
        let provider = Arc::clone(&provider);
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let seen = AtomicU32::new(0);
            let failures = task % 3;
            let result = provider
                .execute_async(
                    &(),
                    || {
                        let n = seen.fetch_add(1, Ordering::SeqCst) as usize + 1;
                        async move { if n <= failures { Err(Flaky) } else { Ok(n) } }
                    },
                    &token,
                )
                .await;
            assert_eq!(result.unwrap(), failures + 1);
        }));
    }

    for handle in handles {
        handle.await.expect("stress task panicked");
    }

    assert!(provider.pool_size() <= TASKS);
}
