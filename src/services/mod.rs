//! Services: the step implementations, the executor and the runner.

pub mod executor;
pub mod metrics;
pub mod runner;
pub mod steps;

pub use executor::Executor;
pub use metrics::{InMemoryMetrics, TracingMetrics};
pub use runner::{classify, LinkedIssue, Runner};
pub use steps::{run_step, StepCollaborators};
