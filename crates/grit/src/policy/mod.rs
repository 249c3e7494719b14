// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Pluggable retry policies and the capability contract they satisfy.
//!
//! A [`RetryPolicy`] encapsulates two independent concerns:
//!
//! - **Stateless classification**: is this kind of call eligible for retry at
//!   all ([`retry_condition`][RetryPolicy::retry_condition]), and is a given
//!   failure transient ([`is_transient`][RetryPolicy::is_transient])?
//! - **Stateful attempt bookkeeping**: how many attempts have been made, and
//!   how long to wait before the next one
//!   ([`try_next_interval`][RetryPolicy::try_next_interval]).
//!
//! The provider only ever invokes the stateless methods on its long-lived
//! prototype instance; all attempt bookkeeping happens on clones produced by
//! [`clone_policy`][RetryPolicy::clone_policy] and recycled through the
//! provider's internal pool via [`reset`][RetryPolicy::reset]. This split is
//! what makes concurrent calls safe without locking around the retry loop.
//!
//! [`BackoffPolicy`] implements the contract for the three classic schedules
//! (fixed, incremental, exponential); custom policies only need to implement
//! the trait.

use std::fmt::Debug;
use std::time::Duration;

mod backoff;
mod callbacks;
mod constants;
mod options;

pub use backoff::BackoffPolicy;
pub(crate) use callbacks::{RetryCondition, TransientPredicate};
pub use options::{Backoff, RetryPolicyOptions};

/// Capability contract consumed by the retry provider.
///
/// One instance tracks one logical attempt sequence. The invariant
/// `0 <= current <= num_tries` holds at all times; `current` starts at 0, is
/// advanced only by [`try_next_interval`][Self::try_next_interval], and is
/// returned to 0 by [`reset`][Self::reset].
pub trait RetryPolicy<S, E>: Debug + Send + Sync {
    /// Decides whether this *kind* of call is eligible for retry at all, for
    /// example whether the sender is currently inside a manual transaction.
    ///
    /// Stateless; the provider evaluates it once per top-level call, not per
    /// attempt. The default accepts every sender.
    fn retry_condition(&self, _sender: &S) -> bool {
        true
    }

    /// Classifies whether a specific failure is worth retrying.
    ///
    /// Stateless; invoked on the provider's prototype for every failure.
    fn is_transient(&self, error: &E) -> bool;

    /// Advances the attempt counter and computes the wait before the next
    /// attempt, or returns `None` when the attempt budget is exhausted.
    ///
    /// Incrementing and interval computation are a single call on purpose:
    /// there is no separate "peek interval" step that could double-count
    /// attempts under misuse.
    fn try_next_interval(&mut self) -> Option<Duration>;

    /// Number of attempts made so far in this sequence (0-based).
    fn current(&self) -> u32;

    /// Total attempts allowed before exhaustion, including the first one.
    fn num_tries(&self) -> u32;

    /// Returns the attempt counter to 0 in place, for reuse without
    /// reallocation.
    fn reset(&mut self);

    /// Produces an independent instance with the same configuration and a
    /// fresh attempt counter.
    fn clone_policy(&self) -> Box<dyn RetryPolicy<S, E>>;
}
