// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Retries a flaky "connection open" with exponential backoff, watching the
//! pool gauges through the periodic reporter.
//!
//! Run with `cargo run --example retry`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use grit::{
    BackoffPolicy, CancellationToken, CounterReporter, PoolCounters, PoolGauge, RetryPolicyOptions, RetryProvider,
};

#[derive(Debug)]
enum DbError {
    Timeout,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let policy = BackoffPolicy::exponential(
        RetryPolicyOptions {
            num_tries: 5,
            base_delay: Duration::from_millis(50),
            max_delay: Some(Duration::from_secs(1)),
            use_jitter: true,
        },
        |_: &DbError| true,
    );

    let provider = RetryProvider::builder(policy)
        .enabled(true)
        .on_retrying(|args| {
            tracing::info!(
                attempt = args.attempt(),
                delay_ms = args.delay().as_millis(),
                errors = args.errors().len(),
                "retrying connection open",
            );
        })
        .build();

    let counters = PoolCounters::new();
    let reporter = CounterReporter::spawn(counters.clone(), Duration::from_millis(25));

    let attempts = AtomicU32::new(0);
    let token = CancellationToken::new();

    let result = provider
        .execute_async(
            &"connection-open",
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                counters.incr(PoolGauge::HardConnectionsActive);
                let counters = counters.clone();
                async move {
                    if n < 4 {
                        counters.decr(PoolGauge::HardConnectionsActive);
                        Err(DbError::Timeout)
                    } else {
                        counters.incr(PoolGauge::SoftConnectionsActive);
                        Ok(n)
                    }
                }
            },
            &token,
        )
        .await;

    match result {
        Ok(n) => tracing::info!(attempts = n, "connected"),
        Err(error) => tracing::error!(error = ?error, "gave up"),
    }

    // Give the sampler one tick to catch up, then print the gauges.
    tokio::time::sleep(Duration::from_millis(50)).await;
    for (gauge, value) in reporter.latest().iter() {
        println!("{gauge} = {value}");
    }
}
