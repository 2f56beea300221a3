pub mod action;
pub mod bug;
pub mod config;
pub mod context;
pub mod event;
pub mod jira;
pub mod step;

pub use action::{Action, ActionParams, ActionSteps, Actions, LabelsBrackets};
pub use bug::{Bug, BugComment};
pub use config::{LogFormat, LoggingConfig, RotationPolicy, Settings};
pub use context::{
    ActionContext, ActionResult, Operation, ResponsesByStep, RunnerContext, StepResponses,
};
pub use event::{EventTarget, WebhookEvent, WebhookEventChange, WebhookRequest, WebhookUser};
pub use jira::{JiraContext, JiraIssue, NewIssue};
pub use step::{Step, StepRequirements, StepsByOperation};
