//! Metrics port.

use std::time::Duration;

/// Sink for process-wide counters and timers.
///
/// Names are dotted, e.g. `jbi.action.devtest.incomplete.count`.
pub trait MetricsSink: Send + Sync {
    fn incr(&self, name: &str);

    fn timing(&self, name: &str, elapsed: Duration);
}
