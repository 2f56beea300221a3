//! Metric names and the bundled metrics sinks.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::domain::ports::MetricsSink;

/// Requests that ran their steps to the end.
pub const PROCESSED: &str = "jbi.bugzilla.processed.count";

/// Requests rejected as ignorable, whatever the reason.
pub const IGNORED: &str = "jbi.bugzilla.ignored.count";

/// Wall time of a whole request.
pub const EXECUTION_TIMER: &str = "jbi.action.execution.timer";

/// Steps that stopped half-way for the action tagged `whiteboard_tag`.
pub fn incomplete(whiteboard_tag: &str) -> String {
    format!("jbi.action.{whiteboard_tag}.incomplete.count")
}

/// Executions that failed after at least one step reached Jira or Bugzilla.
pub fn aborted(whiteboard_tag: &str) -> String {
    format!("jbi.action.{whiteboard_tag}.aborted.count")
}

/// Counters and timings kept in memory.
///
/// Used by tests and by embedders that read counters in process.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: Mutex<HashMap<String, u64>>,
    timings: Mutex<HashMap<String, Vec<Duration>>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter; zero if never incremented.
    pub fn count(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Recorded timings for `name`, in recording order.
    pub fn timings(&self, name: &str) -> Vec<Duration> {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of all counters.
    pub fn counters(&self) -> HashMap<String, u64> {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MetricsSink for InMemoryMetrics {
    fn incr(&self, name: &str) {
        *self
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert(0) += 1;
    }

    fn timing(&self, name: &str, elapsed: Duration) {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .push(elapsed);
    }
}

/// Emits every metric as a `tracing` event on the `jbi::metrics` target.
///
/// Lets a log pipeline build counters without a dedicated metrics daemon.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn incr(&self, name: &str) {
        tracing::info!(
            target: "jbi::metrics",
            metric = name,
            kind = "counter",
            value = 1u64,
            "metric"
        );
    }

    fn timing(&self, name: &str, elapsed: Duration) {
        tracing::info!(
            target: "jbi::metrics",
            metric = name,
            kind = "timer",
            elapsed_ms = elapsed.as_millis() as u64,
            "metric"
        );
    }
}
