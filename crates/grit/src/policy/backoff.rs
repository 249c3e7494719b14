// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cmp::min;
use std::fmt;
use std::time::Duration;

use crate::policy::{Backoff, RetryCondition, RetryPolicy, RetryPolicyOptions, TransientPredicate};
use crate::rnd::Rnd;

/// The fraction of a nominal delay covered by jitter; with 0.5, jittered
/// delays fall uniformly in `[0.75×delay, 1.25×delay)`.
const JITTER_SPREAD: f64 = 0.5;

/// Retry policy computing waits from one of the three classic schedules.
///
/// A policy combines:
///
/// - a [`Backoff`] schedule and its [`RetryPolicyOptions`],
/// - a transient-fault classifier (required), and
/// - an optional call-eligibility condition (defaults to "always eligible").
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use grit::{BackoffPolicy, RetryPolicy, RetryPolicyOptions};
///
/// let mut policy: BackoffPolicy<(), std::io::Error> = BackoffPolicy::fixed(
///     RetryPolicyOptions {
///         num_tries: 3,
///         base_delay: Duration::from_millis(100),
///         max_delay: None,
///         use_jitter: false,
///     },
///     |e: &std::io::Error| e.kind() == std::io::ErrorKind::TimedOut,
/// );
///
/// assert_eq!(policy.try_next_interval(), Some(Duration::from_millis(100)));
/// assert_eq!(policy.current(), 1);
/// ```
pub struct BackoffPolicy<S, E> {
    kind: Backoff,
    options: RetryPolicyOptions,
    current: u32,
    rnd: Rnd,
    transient: TransientPredicate<E>,
    condition: Option<RetryCondition<S>>,
}

impl<S, E> BackoffPolicy<S, E> {
    /// Creates a policy with the given schedule, options, and transient-fault
    /// classifier.
    pub fn new<F>(kind: Backoff, options: RetryPolicyOptions, transient: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            kind,
            options,
            current: 0,
            rnd: Rnd::default(),
            transient: TransientPredicate::new(transient),
            condition: None,
        }
    }

    /// Creates a policy waiting `base_delay` between all attempts.
    pub fn fixed<F>(options: RetryPolicyOptions, transient: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::new(Backoff::Fixed, options, transient)
    }

    /// Creates a policy with linearly growing delays.
    pub fn incremental<F>(options: RetryPolicyOptions, transient: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::new(Backoff::Incremental, options, transient)
    }

    /// Creates a policy with exponentially growing delays.
    pub fn exponential<F>(options: RetryPolicyOptions, transient: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::new(Backoff::Exponential, options, transient)
    }

    /// Restricts retry eligibility to senders accepted by `condition`, for
    /// example commands not currently enlisted in a manual transaction.
    #[must_use]
    pub fn retry_condition_with<F>(mut self, condition: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(RetryCondition::new(condition));
        self
    }

    /// Computes the wait for the given 1-based attempt number.
    fn interval_for(&self, attempt: u32) -> Duration {
        let base = self.options.base_delay;
        let nominal = match self.kind {
            Backoff::Fixed => base,
            Backoff::Incremental => base.saturating_mul(attempt),
            Backoff::Exponential => mul_pow2(base, attempt.saturating_sub(1)),
        };

        let delay = if self.options.use_jitter {
            apply_jitter(nominal, self.rnd)
        } else {
            nominal
        };

        clamp_to_max(delay, self.options.max_delay)
    }

    #[cfg(test)]
    pub(crate) fn with_rnd(mut self, rnd: Rnd) -> Self {
        self.rnd = rnd;
        self
    }
}

impl<S: 'static, E: 'static> RetryPolicy<S, E> for BackoffPolicy<S, E> {
    fn retry_condition(&self, sender: &S) -> bool {
        self.condition.as_ref().is_none_or(|condition| condition.call(sender))
    }

    fn is_transient(&self, error: &E) -> bool {
        self.transient.call(error)
    }

    fn try_next_interval(&mut self) -> Option<Duration> {
        // Exhausted sequences stay exhausted; the counter never passes the budget.
        if self.current >= self.options.num_tries {
            return None;
        }

        self.current = self.current.saturating_add(1);
        if self.current >= self.options.num_tries {
            return None;
        }

        Some(self.interval_for(self.current))
    }

    fn current(&self) -> u32 {
        self.current
    }

    fn num_tries(&self) -> u32 {
        self.options.num_tries
    }

    fn reset(&mut self) {
        self.current = 0;
    }

    fn clone_policy(&self) -> Box<dyn RetryPolicy<S, E>> {
        let mut clone = self.clone();
        clone.current = 0;
        Box::new(clone)
    }
}

// Manual impls: derives would put unnecessary bounds on `S` and `E`.
impl<S, E> Clone for BackoffPolicy<S, E> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            options: self.options.clone(),
            current: self.current,
            rnd: self.rnd,
            transient: self.transient.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<S, E> fmt::Debug for BackoffPolicy<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffPolicy")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

fn clamp_to_max(delay: Duration, max: Option<Duration>) -> Duration {
    max.map_or(delay, |m| min(delay, m))
}

fn mul_pow2(base: Duration, exponent: u32) -> Duration {
    let factor = 2f64.powi(i32::try_from(exponent).unwrap_or(i32::MAX));
    secs_to_duration_saturating(base.as_secs_f64() * factor)
}

/// Scales the delay by a uniform factor in `[1 - SPREAD/2, 1 + SPREAD/2)`.
fn apply_jitter(delay: Duration, rnd: Rnd) -> Duration {
    let scale = JITTER_SPREAD.mul_add(rnd.next_f64() - 0.5, 1.0);
    secs_to_duration_saturating(delay.as_secs_f64() * scale)
}

fn secs_to_duration_saturating(secs: f64) -> Duration {
    if secs <= 0.0 {
        return Duration::ZERO;
    }

    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
