//! JBI - Bugzilla to Jira action runner
//!
//! Turns Bugzilla webhook requests into Jira changes. Each request is matched
//! to a configured action through the bug's whiteboard tags, classified as a
//! create, update or comment operation, and run through that action's steps.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, port traits and errors
//! - **Service Layer** (`services`): steps, executor and runner
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): offline inspection commands
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jbi::{ConfigLoader, Runner, TracingMetrics};
//!
//! let actions = ConfigLoader::load_actions("config/config.local.yaml")?;
//! let runner = Runner::new(bugzilla, jira, Arc::new(TracingMetrics));
//! let result = runner.execute_action(&request, &actions).await?;
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ConfigError, RunnerError, RunnerResult, ServiceError, StepError};
pub use domain::models::{
    Action, ActionContext, ActionParams, ActionResult, Actions, Bug, Operation, Settings, Step,
    WebhookEvent, WebhookRequest,
};
pub use domain::ports::{BugzillaService, JiraService, MetricsSink};
pub use infrastructure::config::ConfigLoader;
pub use services::{Executor, InMemoryMetrics, Runner, TracingMetrics};
