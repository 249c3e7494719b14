// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::mem;
use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::RetryError;
use crate::policy::RetryPolicy;
use crate::provider::{OnRetrying, PolicyPool, RetryingArgs};

/// Orchestrates retry attempts around caller-supplied operations.
///
/// The provider owns a long-lived prototype policy used only for the
/// stateless questions (call eligibility, transient classification) and a
/// pool of policy clones that carry per-call attempt state. Construction goes
/// through [`RetryProvider::builder`]; see the
/// [module docs][crate::provider] for the full picture and examples.
#[derive(Debug)]
pub struct RetryProvider<S, E> {
    prototype: Box<dyn RetryPolicy<S, E>>,
    pool: PolicyPool<S, E>,
    observers: Vec<OnRetrying<E>>,
    enabled: bool,
}

impl<S, E> RetryProvider<S, E> {
    /// Starts building a provider around the given prototype policy.
    pub fn builder(prototype: impl RetryPolicy<S, E> + 'static) -> super::RetryProviderBuilder<S, E> {
        super::RetryProviderBuilder::new(Box::new(prototype))
    }

    pub(crate) fn new(prototype: Box<dyn RetryPolicy<S, E>>, observers: Vec<OnRetrying<E>>, enabled: bool) -> Self {
        Self {
            prototype,
            pool: PolicyPool::default(),
            observers,
            enabled,
        }
    }

    /// Whether retry behavior is enabled for this provider.
    ///
    /// A disabled provider executes operations exactly once and propagates
    /// their errors unchanged.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of idle attempt-state instances currently pooled.
    ///
    /// Administrative surface for tests and telemetry; the steady-state value
    /// is bounded by the peak number of concurrently retrying calls.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Drops every idle pooled attempt-state instance.
    ///
    /// In-flight calls are unaffected; their borrowed instances simply seed
    /// the pool again when they complete.
    pub fn clear_pool(&self) {
        self.pool.clear();
    }

    /// Executes `operation`, retrying transient failures per the configured
    /// policy. Blocks the calling thread during attempts and backoff waits.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Operation`] for non-retryable failures
    /// (unchanged), [`RetryError::Exhausted`] when the attempt budget is
    /// consumed, or [`RetryError::Canceled`] when an observer vetoes the
    /// sequence.
    pub fn execute<T>(&self, sender: &S, mut operation: impl FnMut() -> Result<T, E>) -> Result<T, RetryError<E>> {
        let mut call = CallState::new(self);

        loop {
            match operation() {
                Ok(value) => {
                    call.release();
                    return Ok(value);
                }
                Err(error) => match call.after_failure(sender, error) {
                    ControlFlow::Continue(delay) => thread::sleep(delay),
                    ControlFlow::Break(terminal) => return Err(terminal),
                },
            }
        }
    }

    /// Executes the future-producing `operation`, retrying transient failures
    /// per the configured policy. Suspends only the logical call; both the
    /// in-flight attempt and the backoff wait race against `token` and abort
    /// the sequence when it fires.
    ///
    /// The unit-returning shape is this same entry point with `T = ()`.
    ///
    /// # Errors
    ///
    /// As [`execute`][Self::execute], plus [`RetryError::Interrupted`] when
    /// `token` is canceled during an attempt or a backoff wait.
    pub async fn execute_async<T, F, Fut>(
        &self,
        sender: &S,
        mut operation: F,
        token: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut call = CallState::new(self);

        loop {
            // Checked before invoking the operation so a pre-canceled token
            // never runs it at all.
            if token.is_cancelled() {
                return Err(call.interrupted());
            }

            let outcome = tokio::select! {
                () = token.cancelled() => return Err(call.interrupted()),
                outcome = operation() => outcome,
            };

            match outcome {
                Ok(value) => {
                    call.release();
                    return Ok(value);
                }
                Err(error) => match call.after_failure(sender, error) {
                    ControlFlow::Continue(delay) => {
                        tokio::select! {
                            () = token.cancelled() => return Err(call.interrupted()),
                            () = tokio::time::sleep(delay) => {}
                        }
                    }
                    ControlFlow::Break(terminal) => return Err(terminal),
                },
            }
        }
    }
}

/// Mutable state of one in-flight call: the lazily borrowed attempt-state
/// instance, the ordered error log, and the cached eligibility verdict.
///
/// The borrowed instance is returned to the pool on every exit path.
struct CallState<'p, S, E> {
    provider: &'p RetryProvider<S, E>,
    policy: Option<Box<dyn RetryPolicy<S, E>>>,
    errors: Vec<E>,
    eligible: Option<bool>,
}

impl<'p, S, E> CallState<'p, S, E> {
    fn new(provider: &'p RetryProvider<S, E>) -> Self {
        Self {
            provider,
            policy: None,
            errors: Vec::new(),
            eligible: None,
        }
    }

    /// Decides what one failed attempt means for the call: continue after a
    /// delay, or stop with a terminal failure. Shared by the blocking and
    /// asynchronous entry points so their semantics cannot drift apart.
    fn after_failure(&mut self, sender: &S, error: E) -> ControlFlow<RetryError<E>, Duration> {
        let provider = self.provider;

        if !provider.enabled || !self.is_eligible(sender) || !provider.prototype.is_transient(&error) {
            self.release();
            return ControlFlow::Break(RetryError::Operation(error));
        }

        // First retryable failure of this call borrows the attempt state;
        // later failures keep using the same instance.
        let policy = self.policy.get_or_insert_with(|| provider.checkout());
        self.errors.push(error);

        let Some(delay) = policy.try_next_interval() else {
            let num_tries = policy.num_tries();
            self.release();
            return ControlFlow::Break(RetryError::Exhausted {
                num_tries,
                errors: mem::take(&mut self.errors),
            });
        };

        let attempt = policy.current();
        let budget = policy.num_tries();

        tracing::event!(
            name: "grit.retry",
            tracing::Level::WARN,
            attempt.index = attempt,
            attempt.budget = budget,
            retry.delay = delay.as_secs_f64(),
            "transient failure, scheduling retry",
        );

        let canceled = {
            let mut args = RetryingArgs::new(attempt, delay, &self.errors);
            for observer in &provider.observers {
                observer.call(&mut args);
            }
            args.is_canceled()
        };

        if canceled {
            self.release();
            return ControlFlow::Break(RetryError::Canceled {
                attempts: attempt,
                errors: mem::take(&mut self.errors),
            });
        }

        ControlFlow::Continue(delay)
    }

    /// Builds the terminal failure for external cancellation.
    fn interrupted(&mut self) -> RetryError<E> {
        self.release();
        RetryError::Interrupted {
            attempts: u32::try_from(self.errors.len()).unwrap_or(u32::MAX),
            errors: mem::take(&mut self.errors),
        }
    }

    /// Eligibility is evaluated once per top-level call, on the first
    /// failure, never per attempt.
    fn is_eligible(&mut self, sender: &S) -> bool {
        let provider = self.provider;
        *self.eligible.get_or_insert_with(|| provider.prototype.retry_condition(sender))
    }

    /// Returns the borrowed attempt-state instance, if any, to the pool.
    fn release(&mut self) {
        if let Some(policy) = self.policy.take() {
            self.provider.pool.put(policy);
        }
    }
}

impl<S, E> RetryProvider<S, E> {
    fn checkout(&self) -> Box<dyn RetryPolicy<S, E>> {
        self.pool.take().unwrap_or_else(|| self.prototype.clone_policy())
    }
}
