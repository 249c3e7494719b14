// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::slice;

use thiserror::Error;

/// Terminal outcome of a retried operation that did not succeed.
///
/// The retry engine never swallows a failure. Every failed attempt's error is
/// recorded in order, and the variant tells the caller *why* the sequence
/// stopped:
///
/// - [`Operation`][RetryError::Operation]: the failure was not eligible for
///   retry (retries disabled, call kind ineligible, or error not transient).
///   The original error is carried through unmodified.
/// - [`Exhausted`][RetryError::Exhausted]: the policy's attempt budget was
///   consumed without a success.
/// - [`Canceled`][RetryError::Canceled]: a retry-notification observer vetoed
///   continuation.
/// - [`Interrupted`][RetryError::Interrupted]: the caller's cancellation token
///   fired during an attempt or a backoff wait (asynchronous execution only).
///
/// The aggregated variants own the full ordered log of every transient error
/// observed in the sequence; nothing is dropped. Use [`errors`][Self::errors]
/// or [`into_errors`][Self::into_errors] to inspect it.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The operation failed and the failure is not retryable.
    ///
    /// The inner error propagates unchanged, so callers that never opted into
    /// retry semantics observe exactly what the operation produced.
    #[error(transparent)]
    Operation(E),

    /// Every allowed attempt failed with a transient error.
    #[error("the number of retries has exceeded the maximum of {num_tries} attempts")]
    Exhausted {
        /// The attempt budget the policy was configured with.
        num_tries: u32,
        /// Every transient error observed, in the order it occurred.
        errors: Vec<E>,
    },

    /// A retry-notification observer requested cancellation.
    #[error("retrying was canceled by an observer after {attempts} attempts")]
    Canceled {
        /// Attempts made before the observer canceled.
        attempts: u32,
        /// Every transient error observed, in the order it occurred.
        errors: Vec<E>,
    },

    /// The caller's cancellation token fired before the sequence completed.
    #[error("retrying was interrupted by cancellation after {attempts} attempts")]
    Interrupted {
        /// Attempts made before cancellation.
        attempts: u32,
        /// Every transient error observed, in the order it occurred.
        errors: Vec<E>,
    },
}

impl<E> RetryError<E> {
    /// Returns the ordered log of operation errors behind this failure.
    ///
    /// For [`Operation`][Self::Operation] this is a one-element view of the
    /// original error.
    #[must_use]
    pub fn errors(&self) -> &[E] {
        match self {
            Self::Operation(error) => slice::from_ref(error),
            Self::Exhausted { errors, .. } | Self::Canceled { errors, .. } | Self::Interrupted { errors, .. } => errors,
        }
    }

    /// Consumes the failure, returning the ordered error log.
    #[must_use]
    pub fn into_errors(self) -> Vec<E> {
        match self {
            Self::Operation(error) => vec![error],
            Self::Exhausted { errors, .. } | Self::Canceled { errors, .. } | Self::Interrupted { errors, .. } => errors,
        }
    }

    /// Returns the number of attempts the operation was actually invoked.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Operation(_) => 1,
            Self::Exhausted { errors, .. } => u32::try_from(errors.len()).unwrap_or(u32::MAX),
            Self::Canceled { attempts, .. } | Self::Interrupted { attempts, .. } => *attempts,
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;

    #[derive(Debug, PartialEq, Error)]
    #[error("boom {0}")]
    struct Boom(u32);

    assert_impl_all!(RetryError<Boom>: Debug, Send, Sync, std::error::Error);

    #[test]
    fn operation_is_transparent() {
        let err = RetryError::Operation(Boom(7));
        assert_eq!(err.to_string(), "boom 7");
        assert_eq!(err.errors(), &[Boom(7)]);
        assert_eq!(err.attempts(), 1);
    }

    #[test]
    fn exhausted_message_carries_budget() {
        let err = RetryError::Exhausted {
            num_tries: 3,
            errors: vec![Boom(1), Boom(2), Boom(3)],
        };

        assert_eq!(err.to_string(), "the number of retries has exceeded the maximum of 3 attempts");
        assert_eq!(err.errors(), &[Boom(1), Boom(2), Boom(3)]);
        assert_eq!(err.attempts(), 3);
    }

    #[test]
    fn canceled_message_carries_attempts_so_far() {
        let err = RetryError::Canceled {
            attempts: 2,
            errors: vec![Boom(1), Boom(2)],
        };

        assert_eq!(err.to_string(), "retrying was canceled by an observer after 2 attempts");
        assert_eq!(err.attempts(), 2);
    }

    #[test]
    fn interrupted_message_is_distinct() {
        let err = RetryError::Interrupted {
            attempts: 1,
            errors: vec![Boom(1)],
        };

        assert_eq!(err.to_string(), "retrying was interrupted by cancellation after 1 attempts");
    }

    #[test]
    fn into_errors_preserves_order() {
        let err = RetryError::Exhausted {
            num_tries: 2,
            errors: vec![Boom(1), Boom(2)],
        };

        assert_eq!(err.into_errors(), vec![Boom(1), Boom(2)]);
        assert_eq!(RetryError::Operation(Boom(9)).into_errors(), vec![Boom(9)]);
    }
}
