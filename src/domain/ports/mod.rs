//! Port trait definitions (Hexagonal Architecture)
//!
//! The engine talks to the outside world through these traits only:
//! - BugzillaService: reading bugs and writing see-also links
//! - JiraService: reading and changing issues
//! - MetricsSink: counters and timers

pub mod bugzilla;
pub mod jira;
pub mod metrics;

pub use bugzilla::BugzillaService;
pub use jira::JiraService;
pub use metrics::MetricsSink;
