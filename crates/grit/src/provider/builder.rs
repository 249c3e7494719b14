// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::env;

use crate::policy::RetryPolicy;
use crate::provider::{OnRetrying, RetryProvider, RetryingArgs};

/// Name of the process-wide switch that turns retry behavior on.
///
/// The switch is read once, when a builder is created. Accepted "on" values
/// are `1` and `true` (case-insensitive); anything else, including an unset
/// variable, leaves retries off and the provider degrades to a plain
/// pass-through.
pub const RETRY_SWITCH: &str = "GRIT_ENABLE_RETRIES";

/// Builder for [`RetryProvider`].
///
/// Created by [`RetryProvider::builder`]. The prototype policy is required;
/// everything else has defaults: the enable flag comes from the
/// [`RETRY_SWITCH`] environment switch and no observers are registered.
#[derive(Debug)]
pub struct RetryProviderBuilder<S, E> {
    prototype: Box<dyn RetryPolicy<S, E>>,
    observers: Vec<OnRetrying<E>>,
    enabled: bool,
}

impl<S, E> RetryProviderBuilder<S, E> {
    pub(crate) fn new(prototype: Box<dyn RetryPolicy<S, E>>) -> Self {
        Self {
            prototype,
            observers: Vec::new(),
            enabled: switch_enabled(env::var(RETRY_SWITCH).ok().as_deref()),
        }
    }

    /// Overrides the process-wide enable switch for this provider.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Registers a retry-notification observer.
    ///
    /// Observers are invoked synchronously, in registration order, once per
    /// retry decision and strictly before the backoff wait. Any observer may
    /// cancel the remaining sequence via
    /// [`RetryingArgs::cancel`][crate::RetryingArgs::cancel].
    #[must_use]
    pub fn on_retrying<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut RetryingArgs<'_, E>) + Send + Sync + 'static,
    {
        self.observers.push(OnRetrying::new(observer));
        self
    }

    /// Builds the provider.
    #[must_use]
    pub fn build(self) -> RetryProvider<S, E> {
        RetryProvider::new(self.prototype, self.observers, self.enabled)
    }
}

fn switch_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim();
        v == "1" || v.eq_ignore_ascii_case("true")
    })
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, false)]
    #[case(Some(""), false)]
    #[case(Some("0"), false)]
    #[case(Some("yes"), false)]
    #[case(Some("1"), true)]
    #[case(Some("true"), true)]
    #[case(Some("TRUE"), true)]
    #[case(Some(" true "), true)]
    fn switch_parsing(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(switch_enabled(value), expected);
    }
}
