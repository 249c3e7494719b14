// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Observational connection-pool counters and their periodic reporter.
//!
//! The retry engine never reads these values; they exist for operators and
//! tests. The connection-pool collaborator increments and decrements the
//! gauges through a shared [`PoolCounters`] handle, and a [`CounterReporter`]
//! samples the whole set on a fixed interval and publishes immutable
//! snapshots on a watch channel. Consumers must tolerate sampling delay:
//! poll [`CounterReporter::latest`] (or await changes on a subscription)
//! until a reading stabilizes rather than assuming synchronous updates.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The individual pool gauges that can be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolGauge {
    /// Physical connections currently open against the server.
    HardConnectionsActive,
    /// Logical connections currently handed out to application code.
    SoftConnectionsActive,
    /// Connections whose lifetime is managed by a pool.
    PooledConnections,
    /// Connections opened outside any pool.
    NonPooledConnections,
    /// Pools currently accepting checkouts.
    ActivePools,
    /// Pools drained and awaiting pruning.
    InactivePools,
    /// Pool groups currently accepting checkouts.
    ActivePoolGroups,
    /// Pool groups drained and awaiting pruning.
    InactivePoolGroups,
    /// Idle pooled connections ready for checkout.
    FreeConnections,
    /// Connections closed by the application while still enlisted in an
    /// ambient transaction, held until the transaction completes.
    StasisConnections,
}

impl PoolGauge {
    const ALL: [Self; 10] = [
        Self::HardConnectionsActive,
        Self::SoftConnectionsActive,
        Self::PooledConnections,
        Self::NonPooledConnections,
        Self::ActivePools,
        Self::InactivePools,
        Self::ActivePoolGroups,
        Self::InactivePoolGroups,
        Self::FreeConnections,
        Self::StasisConnections,
    ];

    /// The stable dotted name used when emitting this gauge.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HardConnectionsActive => "pool.connections.hard.active",
            Self::SoftConnectionsActive => "pool.connections.soft.active",
            Self::PooledConnections => "pool.connections.pooled",
            Self::NonPooledConnections => "pool.connections.nonpooled",
            Self::ActivePools => "pool.pools.active",
            Self::InactivePools => "pool.pools.inactive",
            Self::ActivePoolGroups => "pool.groups.active",
            Self::InactivePoolGroups => "pool.groups.inactive",
            Self::FreeConnections => "pool.connections.free",
            Self::StasisConnections => "pool.connections.stasis",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|g| *g == self).unwrap_or(0)
    }
}

impl fmt::Display for PoolGauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared, thread-safe handle to the pool gauges.
///
/// Cloning is cheap and every clone observes the same values. Writers call
/// [`incr`][Self::incr] and [`decr`][Self::decr]; decrements saturate at zero
/// so a misordered close can never wrap a gauge around.
#[derive(Debug, Clone, Default)]
pub struct PoolCounters {
    values: Arc<[AtomicU64; 10]>,
}

impl PoolCounters {
    /// Creates a fresh handle with all gauges at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments `gauge` by one.
    pub fn incr(&self, gauge: PoolGauge) {
        let _ = self.values[gauge.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements `gauge` by one, saturating at zero.
    pub fn decr(&self, gauge: PoolGauge) {
        let _ = self.values[gauge.index()].fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
            Some(v.saturating_sub(1))
        });
    }

    /// Current value of a single gauge.
    #[must_use]
    pub fn get(&self, gauge: PoolGauge) -> u64 {
        self.values[gauge.index()].load(Ordering::Relaxed)
    }

    /// Consistent-enough point-in-time copy of every gauge.
    ///
    /// Individual gauges are read independently, so a snapshot taken during
    /// concurrent updates may mix values from slightly different instants.
    #[must_use]
    pub fn snapshot(&self) -> PoolCountersSnapshot {
        let mut values = [0u64; 10];
        for (slot, cell) in values.iter_mut().zip(self.values.iter()) {
            *slot = cell.load(Ordering::Relaxed);
        }
        PoolCountersSnapshot { values }
    }
}

/// Immutable point-in-time copy of every pool gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolCountersSnapshot {
    values: [u64; 10],
}

impl PoolCountersSnapshot {
    /// Value of a single gauge in this snapshot.
    #[must_use]
    pub fn get(&self, gauge: PoolGauge) -> u64 {
        self.values[gauge.index()]
    }

    /// Iterates over every gauge and its value, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolGauge, u64)> + '_ {
        PoolGauge::ALL.iter().map(|g| (*g, self.values[g.index()]))
    }
}

/// Samples a [`PoolCounters`] handle on a fixed interval and publishes
/// snapshots to subscribers.
///
/// The background sampling task is owned by the reporter and aborted on drop,
/// so a forgotten reporter never leaks a task.
#[derive(Debug)]
pub struct CounterReporter {
    rx: watch::Receiver<PoolCountersSnapshot>,
    task: JoinHandle<()>,
}

impl CounterReporter {
    /// Spawns the sampling task on the current tokio runtime.
    ///
    /// A zero `interval` is clamped to one millisecond so the sampler can
    /// never busy-spin the runtime.
    #[must_use]
    pub fn spawn(counters: PoolCounters, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let (tx, rx) = watch::channel(counters.snapshot());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                let _ = ticker.tick().await;
                let snapshot = counters.snapshot();
                // send_if_modified keeps subscribers from waking on quiet
                // sampling periods.
                let _ = tx.send_if_modified(|current| {
                    if *current == snapshot {
                        false
                    } else {
                        *current = snapshot;
                        true
                    }
                });
            }
        });

        Self { rx, task }
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> PoolCountersSnapshot {
        *self.rx.borrow()
    }

    /// Subscribes to snapshot updates.
    ///
    /// The receiver yields a new value each sampling tick on which at least
    /// one gauge changed since the previous publication.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PoolCountersSnapshot> {
        self.rx.clone()
    }
}

impl Drop for CounterReporter {
    fn drop(&mut self) {
        self.task.abort();
    }
}
