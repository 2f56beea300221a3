//! Domain errors for the Bugzilla to Jira integration.
//!
//! Requests end in one of three ways: a list of responses, an ignored
//! request ([`RunnerError::Ignored`]) or an unrecoverable error. The
//! incomplete-step fault ([`StepError::Incomplete`]) never leaves the
//! executor.

use thiserror::Error;

use super::models::context::ActionContext;

/// Configuration errors, raised while loading settings or resolving steps.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported entry in `steps`: '{0}' (expected one of: new, existing, comment)")]
    UnsupportedStepGroup(String),

    #[error("Unknown step '{step}' in `steps.{group}`")]
    UnknownStep { group: String, step: String },

    #[error("Whiteboard tag cannot be empty")]
    EmptyWhiteboardTag,

    #[error("Duplicate whiteboard tag: '{0}'")]
    DuplicateWhiteboardTag(String),

    #[error("Action '{0}' has an empty jira_project_key")]
    EmptyProjectKey(String),

    #[error("No enabled actions configured")]
    NoActions,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Actions file path cannot be empty")]
    EmptyActionsFile,

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Errors raised by the Bugzilla and Jira collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed: {message}")]
    RequestFailed {
        service: &'static str,
        message: String,
    },

    #[error("{service} resource not found: {resource}")]
    NotFound {
        service: &'static str,
        resource: String,
    },

    #[error("Invalid response from {service}: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Raised by `Bug::lookup_action` when no whiteboard tag matches.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ActionNotFoundError(pub String);

/// Errors raised by a single step.
#[derive(Debug, Error)]
pub enum StepError {
    /// The step performed some, but not all, of its external calls.
    ///
    /// Carries the context as of the last successful update so the
    /// executor can carry on with the next step.
    #[error("Step incomplete: {reason}")]
    Incomplete {
        context: Box<ActionContext>,
        reason: String,
    },

    #[error("Step '{step}' requires the {collaborator} collaborator, which was not declared")]
    MissingCollaborator {
        step: &'static str,
        collaborator: &'static str,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Step failed: {0}")]
    Failed(String),
}

impl StepError {
    pub fn incomplete(context: ActionContext, reason: impl Into<String>) -> Self {
        Self::Incomplete {
            context: Box::new(context),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced to callers of the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Not an operational error: the request does not apply to us.
    #[error("Ignored request: {0}")]
    Ignored(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: StepError,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl RunnerError {
    pub fn ignored(reason: impl Into<String>) -> Self {
        Self::Ignored(reason.into())
    }

    pub const fn is_ignorable(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

pub type RunnerResult<T> = Result<T, RunnerError>;
