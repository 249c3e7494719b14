// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Arguments passed to retry-notification observers.
///
/// One snapshot is produced per retry decision, strictly before the backoff
/// wait: the attempt index, the proposed wait, and a read-only view of every
/// transient error observed so far in this call. Observers may veto the
/// remainder of the sequence via [`cancel`][Self::cancel].
///
/// Observers run synchronously on the retry path; keep them fast.
#[derive(Debug)]
pub struct RetryingArgs<'a, E> {
    attempt: u32,
    delay: Duration,
    errors: &'a [E],
    cancel: bool,
}

impl<'a, E> RetryingArgs<'a, E> {
    pub(crate) fn new(attempt: u32, delay: Duration, errors: &'a [E]) -> Self {
        Self {
            attempt,
            delay,
            errors,
            cancel: false,
        }
    }

    /// Number of attempts made so far in this call (1-based at notification
    /// time: the first notification reports attempt 1).
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The wait the engine is about to apply before the next attempt.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Ordered view of every transient error observed so far in this call.
    #[must_use]
    pub fn errors(&self) -> &[E] {
        self.errors
    }

    /// Requests cancellation of the remaining retry sequence.
    ///
    /// The engine treats this like policy exhaustion, except the terminal
    /// failure is [`RetryError::Canceled`][crate::RetryError::Canceled] and no
    /// wait is performed.
    pub fn cancel(&mut self) {
        self.cancel = true;
    }

    /// Whether any observer has requested cancellation.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.cancel
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn snapshot_exposes_decision_context() {
        let errors = vec!["first", "second"];
        let args = RetryingArgs::new(2, Duration::from_secs(5), &errors);

        assert_eq!(args.attempt(), 2);
        assert_eq!(args.delay(), Duration::from_secs(5));
        assert_eq!(args.errors(), &["first", "second"]);
        assert!(!args.is_canceled());
    }

    #[test]
    fn cancel_is_sticky() {
        let errors: Vec<&str> = Vec::new();
        let mut args = RetryingArgs::new(1, Duration::ZERO, &errors);

        args.cancel();
        args.cancel();
        assert!(args.is_canceled());
    }
}
