// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default attempt budget: 5 total attempts (1 original + 4 retries).
///
/// Connection establishment against a provisioning or failing-over database
/// commonly needs a few attempts; five bounds the worst case while keeping
/// interactive callers responsive.
pub(super) const DEFAULT_NUM_TRIES: u32 = 5;

/// Default base delay between attempts: 10 seconds.
///
/// Transient server-side conditions (failover, pool pressure during
/// provisioning) typically clear within tens of seconds; a shorter base delay
/// mostly burns the attempt budget before the condition resolves.
pub(super) const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(10);

/// Default ceiling on a single computed delay: 2 minutes.
///
/// Caps the growth of incremental and exponential schedules so a retried call
/// never silently stalls for many minutes between attempts.
pub(super) const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(120);

/// Enable jitter by default to desynchronize clients and reduce contention.
///
/// Randomizing retry delays mitigates correlated bursts when many clients hit
/// the same transient condition at once.
pub(super) const DEFAULT_USE_JITTER: bool = true;
