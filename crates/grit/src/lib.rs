// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Transient-fault retry engine for database client operations.
//!
//! This crate makes connection and command execution resilient to recoverable
//! failures such as network blips, transient server errors, and pool
//! exhaustion during provisioning. It wraps an arbitrary caller-supplied
//! operation and re-executes it according to a pluggable retry policy until
//! the operation succeeds, the policy's attempt budget is exhausted, or the
//! call is canceled.
//!
//! # Core Types
//!
//! - [`RetryProvider`]: The orchestrator. Runs operations through the retry
//!   loop, in blocking or async form, and pools per-call attempt state so
//!   concurrent calls never interfere.
//! - [`RetryPolicy`]: The pluggable strategy contract: call eligibility,
//!   transient-fault classification, and the atomic
//!   increment-and-compute-interval step.
//! - [`BackoffPolicy`]: The built-in policy family with fixed, incremental,
//!   and exponential schedules, optional jitter, and a delay ceiling.
//! - [`RetryError`]: Terminal failure taxonomy. Non-retryable errors pass
//!   through unchanged; exhaustion and cancellation aggregate every
//!   transient error observed, in order.
//! - [`PoolCounters`] / [`CounterReporter`]: Observational connection-pool
//!   gauges and their periodic sampling channel.
//!
//! Retry behavior is off by default and is enabled either per provider via
//! [`RetryProviderBuilder::enabled`] or process-wide through the
//! [`RETRY_SWITCH`] environment variable.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use grit::{BackoffPolicy, RetryPolicyOptions, RetryProvider};
//!
//! #[derive(Debug)]
//! enum DbError {
//!     Timeout,
//!     SyntaxError,
//! }
//!
//! // Classify timeouts as transient; syntax errors fail immediately.
//! let policy = BackoffPolicy::exponential(
//!     RetryPolicyOptions {
//!         num_tries: 3,
//!         base_delay: Duration::from_millis(1),
//!         max_delay: Some(Duration::from_millis(50)),
//!         use_jitter: false,
//!     },
//!     |error: &DbError| matches!(error, DbError::Timeout),
//! );
//!
//! let provider = RetryProvider::builder(policy).enabled(true).build();
//!
//! let mut attempts = 0;
//! let result: Result<&str, _> = provider.execute(&"connection-open", || {
//!     attempts += 1;
//!     if attempts < 3 { Err(DbError::Timeout) } else { Ok("connected") }
//! });
//!
//! assert_eq!(result.unwrap(), "connected");
//! assert_eq!(attempts, 3);
//! ```

mod counters;
mod error;
mod policy;
mod provider;
mod rnd;

pub use counters::{CounterReporter, PoolCounters, PoolCountersSnapshot, PoolGauge};
pub use error::RetryError;
pub use policy::{Backoff, BackoffPolicy, RetryPolicy, RetryPolicyOptions};
pub use provider::{RETRY_SWITCH, RetryProvider, RetryProviderBuilder, RetryingArgs};

/// Cancellation primitive accepted by
/// [`RetryProvider::execute_async`], re-exported for convenience.
pub use tokio_util::sync::CancellationToken;
