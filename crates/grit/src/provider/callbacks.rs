// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::sync::Arc;

use crate::provider::RetryingArgs;

/// Wraps a registered retry-notification observer in a thread-safe, clonable
/// form.
pub(crate) struct OnRetrying<E>(Arc<dyn Fn(&mut RetryingArgs<'_, E>) + Send + Sync>);

impl<E> OnRetrying<E> {
    pub(crate) fn new<F>(observer: F) -> Self
    where
        F: Fn(&mut RetryingArgs<'_, E>) + Send + Sync + 'static,
    {
        Self(Arc::new(observer))
    }

    pub(crate) fn call(&self, args: &mut RetryingArgs<'_, E>) {
        (self.0)(args);
    }
}

impl<E> Clone for OnRetrying<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> fmt::Debug for OnRetrying<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnRetrying").finish()
    }
}
