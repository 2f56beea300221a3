//! Execution contexts.
//!
//! Contexts are values: every update consumes the old context and returns
//! a new one. A step only ever sees the context it was handed, and a
//! failing step can hand back the context as of its last successful
//! update without exposing anything half-written.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::action::Action;
use super::bug::Bug;
use super::event::WebhookEvent;
use super::jira::JiraContext;

/// The kind of work a request leads to.
///
/// `Create`, `Update` and `Comment` select a step group; the others label
/// phases in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Handle,
    Ignore,
    Create,
    Update,
    Comment,
    Execute,
    Success,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Handle => "handle",
            Self::Ignore => "ignore",
            Self::Create => "create",
            Self::Update => "update",
            Self::Comment => "comment",
            Self::Execute => "execute",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Responses produced by one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResponses {
    pub step: String,
    pub responses: Vec<Value>,
}

/// Append-only record of external responses, in step execution order.
///
/// Only steps that produced at least one response have an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponsesByStep(Vec<StepResponses>);

impl ResponsesByStep {
    /// Responses recorded for `step`; empty when it produced none.
    pub fn get(&self, step: &str) -> &[Value] {
        self.0
            .iter()
            .find(|entry| entry.step == step)
            .map(|entry| entry.responses.as_slice())
            .unwrap_or_default()
    }

    /// Names of the steps with recorded responses.
    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.step.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All responses in step order.
    pub fn flatten(&self) -> Vec<Value> {
        self.0
            .iter()
            .flat_map(|entry| entry.responses.iter().cloned())
            .collect()
    }

    fn appended(mut self, step: &str, responses: Vec<Value>) -> Self {
        if responses.is_empty() {
            return self;
        }
        match self.0.iter_mut().find(|entry| entry.step == step) {
            Some(entry) => entry.responses.extend(responses),
            None => self.0.push(StepResponses {
                step: step.to_string(),
                responses,
            }),
        }
        self
    }
}

/// State threaded through the steps of one action execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionContext {
    action: Action,
    rid: String,
    bug: Bug,
    event: WebhookEvent,
    operation: Operation,
    jira: JiraContext,
    extra: BTreeMap<String, String>,
    current_step: Option<String>,
    responses_by_step: ResponsesByStep,
}

impl ActionContext {
    pub fn new(
        action: Action,
        rid: impl Into<String>,
        bug: Bug,
        event: WebhookEvent,
        operation: Operation,
        jira: JiraContext,
    ) -> Self {
        Self {
            action,
            rid: rid.into(),
            bug,
            event,
            operation,
            jira,
            extra: BTreeMap::new(),
            current_step: None,
            responses_by_step: ResponsesByStep::default(),
        }
    }

    pub const fn action(&self) -> &Action {
        &self.action
    }

    pub fn rid(&self) -> &str {
        &self.rid
    }

    pub const fn bug(&self) -> &Bug {
        &self.bug
    }

    pub const fn event(&self) -> &WebhookEvent {
        &self.event
    }

    pub const fn operation(&self) -> Operation {
        self.operation
    }

    pub const fn jira(&self) -> &JiraContext {
        &self.jira
    }

    pub const fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    pub fn current_step(&self) -> Option<&str> {
        self.current_step.as_deref()
    }

    pub const fn responses_by_step(&self) -> &ResponsesByStep {
        &self.responses_by_step
    }

    /// Only the runner decides the operation, before the executor starts.
    #[must_use]
    pub(crate) fn with_operation(self, operation: Operation) -> Self {
        Self { operation, ..self }
    }

    #[must_use]
    pub fn with_jira_issue(self, issue_key: impl Into<String>) -> Self {
        Self {
            jira: JiraContext {
                issue: Some(issue_key.into()),
                ..self.jira
            },
            ..self
        }
    }

    #[must_use]
    pub fn with_extra(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut extra = self.extra;
        extra.insert(key.into(), value.into());
        Self { extra, ..self }
    }

    /// Merge `entries` into the extras; existing keys are kept.
    #[must_use]
    pub fn with_extra_defaults(self, entries: BTreeMap<String, String>) -> Self {
        let mut extra = entries;
        extra.extend(self.extra);
        Self { extra, ..self }
    }

    #[must_use]
    pub fn with_current_step(self, step: impl Into<String>) -> Self {
        Self {
            current_step: Some(step.into()),
            ..self
        }
    }

    /// Record responses under the currently executing step.
    #[must_use]
    pub fn with_responses<I>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let step = self.current_step.clone().unwrap_or_default();
        let responses_by_step = self
            .responses_by_step
            .appended(&step, responses.into_iter().collect());
        Self {
            responses_by_step,
            ..self
        }
    }

    /// Serialized form attached to log events.
    pub fn log_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Logging context used before an [`ActionContext`] exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerContext {
    rid: String,
    bug: Bug,
    event: WebhookEvent,
    operation: Operation,
    action: Option<Action>,
}

impl RunnerContext {
    pub fn new(
        rid: impl Into<String>,
        bug: Bug,
        event: WebhookEvent,
        operation: Operation,
    ) -> Self {
        Self {
            rid: rid.into(),
            bug,
            event,
            operation,
            action: None,
        }
    }

    pub fn rid(&self) -> &str {
        &self.rid
    }

    pub const fn bug(&self) -> &Bug {
        &self.bug
    }

    pub const fn operation(&self) -> Operation {
        self.operation
    }

    pub const fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    #[must_use]
    pub fn with_bug(&self, bug: Bug) -> Self {
        Self {
            bug,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_action(&self, action: Action) -> Self {
        Self {
            action: Some(action),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_operation(&self, operation: Operation) -> Self {
        Self {
            operation,
            ..self.clone()
        }
    }

    pub fn log_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// What a successful execution returns to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub responses: Vec<Value>,
}
