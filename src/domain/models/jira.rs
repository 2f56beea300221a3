//! Jira-side models used by the engine.

use serde::{Deserialize, Serialize};

/// The Jira part of an execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraContext {
    /// Project key configured on the action.
    pub project: String,
    /// Key of the linked issue, once known.
    pub issue: Option<String>,
}

impl JiraContext {
    pub fn new(project: impl Into<String>, issue: Option<String>) -> Self {
        Self {
            project: project.into(),
            issue,
        }
    }
}

/// The subset of a Jira issue the engine looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub project_key: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Fields of an issue to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub project_key: String,
    pub summary: String,
    pub description: String,
    pub issue_type: String,
    #[serde(default)]
    pub components: Vec<String>,
}
