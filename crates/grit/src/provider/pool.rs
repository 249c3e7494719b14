// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use parking_lot::Mutex;

use crate::policy::RetryPolicy;

/// Unordered pool of idle attempt-state instances.
///
/// Each top-level retryable call borrows at most one instance for its whole
/// lifetime and returns it on every exit path. The pool never blocks beyond
/// its short internal lock: an empty pool is reported to the caller, which
/// falls back to cloning the prototype, and returns always succeed.
///
/// Instances are reset lazily on checkout rather than on return, so a
/// returned instance still carries its final attempt count until reused.
pub(crate) struct PolicyPool<S, E> {
    idle: Mutex<Vec<Box<dyn RetryPolicy<S, E>>>>,
}

impl<S, E> PolicyPool<S, E> {
    /// Borrows an idle instance, reset to a fresh attempt sequence, or `None`
    /// if the pool is empty.
    pub fn take(&self) -> Option<Box<dyn RetryPolicy<S, E>>> {
        let mut policy = self.idle.lock().pop()?;
        policy.reset();
        Some(policy)
    }

    /// Returns an instance to the pool.
    pub fn put(&self, policy: Box<dyn RetryPolicy<S, E>>) {
        self.idle.lock().push(policy);
    }

    /// Number of idle instances currently held.
    pub fn len(&self) -> usize {
        self.idle.lock().len()
    }

    /// Drops every idle instance.
    pub fn clear(&self) {
        self.idle.lock().clear();
    }
}

impl<S, E> Default for PolicyPool<S, E> {
    fn default() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
        }
    }
}

impl<S, E> fmt::Debug for PolicyPool<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyPool").field("idle", &self.len()).finish()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::policy::{Backoff, BackoffPolicy, RetryPolicyOptions};

    assert_impl_all!(PolicyPool<String, std::io::Error>: Send, Sync, std::fmt::Debug);

    fn boxed_policy() -> Box<dyn RetryPolicy<(), u32>> {
        Box::new(BackoffPolicy::new(
            Backoff::Fixed,
            RetryPolicyOptions {
                num_tries: 4,
                base_delay: Duration::from_millis(1),
                max_delay: None,
                use_jitter: false,
            },
            |_| true,
        ))
    }

    #[test]
    fn take_on_empty_pool_is_none() {
        let pool: PolicyPool<(), u32> = PolicyPool::default();
        assert!(pool.take().is_none());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn put_then_take_resets_the_instance() {
        let pool: PolicyPool<(), u32> = PolicyPool::default();

        let mut policy = boxed_policy();
        let _ = policy.try_next_interval();
        let _ = policy.try_next_interval();
        assert_eq!(policy.current(), 2);

        pool.put(policy);
        assert_eq!(pool.len(), 1);

        let reused = pool.take().expect("pool holds an instance");
        assert_eq!(reused.current(), 0);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn clear_drops_idle_instances() {
        let pool: PolicyPool<(), u32> = PolicyPool::default();
        pool.put(boxed_policy());
        pool.put(boxed_policy());
        assert_eq!(pool.len(), 2);

        pool.clear();
        assert_eq!(pool.len(), 0);
        assert!(pool.take().is_none());
    }
}
