// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::policy::constants::{DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_NUM_TRIES, DEFAULT_USE_JITTER};

/// Schedule shape used by [`BackoffPolicy`][crate::BackoffPolicy] to compute
/// the wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay between all attempts (`base_delay`).
    Fixed,

    /// Linearly increasing delay (`base_delay × attempt`).
    Incremental,

    /// Exponentially increasing delay (`base_delay × 2^(attempt-1)`).
    Exponential,
}

/// Configuration for a [`BackoffPolicy`][crate::BackoffPolicy].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use grit::RetryPolicyOptions;
///
/// let options = RetryPolicyOptions {
///     num_tries: 3,
///     base_delay: Duration::from_millis(250),
///     ..RetryPolicyOptions::default()
/// };
/// assert_eq!(options.num_tries, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicyOptions {
    /// Total attempts allowed, including the first one. Must be at least 1;
    /// a value of 0 exhausts the budget on the first failure.
    pub num_tries: u32,

    /// Base delay the schedule is derived from.
    pub base_delay: Duration,

    /// Ceiling applied to every computed delay, or `None` for no limit.
    pub max_delay: Option<Duration>,

    /// Whether to randomize each delay by ±25% to avoid synchronized retries.
    pub use_jitter: bool,
}

impl Default for RetryPolicyOptions {
    fn default() -> Self {
        Self {
            num_tries: DEFAULT_NUM_TRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: Some(DEFAULT_MAX_DELAY),
            use_jitter: DEFAULT_USE_JITTER,
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_options() {
        let options = RetryPolicyOptions::default();

        assert_eq!(options.num_tries, 5);
        assert_eq!(options.base_delay, Duration::from_secs(10));
        assert_eq!(options.max_delay, Some(Duration::from_secs(120)));
        assert!(options.use_jitter);
    }
}
