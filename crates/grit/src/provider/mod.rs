// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The retry orchestrator and its collaborators.
//!
//! [`RetryProvider`] wraps an arbitrary caller-supplied operation and
//! re-executes it according to the configured [`RetryPolicy`][crate::RetryPolicy]
//! until the operation succeeds, the attempt budget is exhausted, or the call
//! is canceled. The same algorithm backs both entry points:
//!
//! - [`execute`][RetryProvider::execute] blocks the calling thread during the
//!   operation and the backoff wait.
//! - [`execute_async`][RetryProvider::execute_async] suspends only the
//!   logical call and honors the caller's
//!   [`CancellationToken`][tokio_util::sync::CancellationToken] during the
//!   wait, not merely before or after it.
//!
//! Per-call attempt state is borrowed from an internal pool of policy clones,
//! so concurrent calls never observe each other's attempt counters, and a
//! quiet steady state allocates nothing per call beyond the first failure.
//!
//! # Quick start
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
//! let policy = BackoffPolicy::exponential(
//!     RetryPolicyOptions {
//!         num_tries: 3,
//!         base_delay: Duration::from_millis(1),
//!         max_delay: None,
//!         use_jitter: false,
//!     },
//!     |error: &DbError| matches!(error, DbError::Timeout),
//! );
//!
//! let provider = RetryProvider::builder(policy).enabled(true).build();
//!
//! let mut connected = false;
//! let result = provider.execute(&"connection-open", || {
//!     if connected {
//!         Ok(42)
//!     } else {
//!         connected = true;
//!         Err(DbError::Timeout)
//!     }
//! });
//!
//! assert_eq!(result.unwrap(), 42);
//! ```

mod args;
mod builder;
mod callbacks;
mod engine;
mod pool;

pub use args::RetryingArgs;
pub use builder::{RETRY_SWITCH, RetryProviderBuilder};
pub(crate) use callbacks::OnRetrying;
pub use engine::RetryProvider;
pub(crate) use pool::PolicyPool;
