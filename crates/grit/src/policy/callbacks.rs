// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::sync::Arc;

/// Wraps the user-provided transient-fault classifier in a thread-safe,
/// clonable form.
pub(crate) struct TransientPredicate<E>(Arc<dyn Fn(&E) -> bool + Send + Sync>);

impl<E> TransientPredicate<E> {
    pub(crate) fn new<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub(crate) fn call(&self, error: &E) -> bool {
        (self.0)(error)
    }
}

impl<E> Clone for TransientPredicate<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> fmt::Debug for TransientPredicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientPredicate").finish()
    }
}

/// Wraps the user-provided call-eligibility predicate.
pub(crate) struct RetryCondition<S>(Arc<dyn Fn(&S) -> bool + Send + Sync>);

impl<S> RetryCondition<S> {
    pub(crate) fn new<F>(condition: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(condition))
    }

    pub(crate) fn call(&self, sender: &S) -> bool {
        (self.0)(sender)
    }
}

impl<S> Clone for RetryCondition<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S> fmt::Debug for RetryCondition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryCondition").finish()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(TransientPredicate<String>: Send, Sync, Clone, std::fmt::Debug);
    assert_impl_all!(RetryCondition<String>: Send, Sync, Clone, std::fmt::Debug);

    #[test]
    fn call_forwards_to_wrapped_fn() {
        let transient = TransientPredicate::new(|v: &u32| *v > 10);
        assert!(transient.call(&11));
        assert!(!transient.call(&10));

        let condition = RetryCondition::new(|s: &String| s.is_empty());
        assert!(condition.call(&String::new()));
        assert!(!condition.call(&"x".to_string()));
    }

    #[test]
    fn clone_shares_the_same_fn() {
        let transient = TransientPredicate::new(|v: &u32| *v == 1);
        let cloned = transient.clone();
        assert_eq!(transient.call(&1), cloned.call(&1));
    }

    #[test]
    fn debug_shows_type_name() {
        let transient = TransientPredicate::new(|_: &u32| true);
        assert_eq!(format!("{transient:?}"), "TransientPredicate");

        let condition = RetryCondition::new(|_: &u32| true);
        assert_eq!(format!("{condition:?}"), "RetryCondition");
    }
}
