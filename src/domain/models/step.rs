//! Step identifiers and their grouping by operation.
//!
//! Steps are referenced by name in the configuration. Names are resolved
//! to [`Step`] values when actions are loaded, so an unknown name is a
//! configuration error rather than a per-request failure.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::action::ActionSteps;
use super::context::Operation;
use crate::domain::errors::ConfigError;

/// Configuration group names and the operation each one runs for.
pub const GROUP_TO_OPERATION: [(&str, Operation); 3] = [
    ("new", Operation::Create),
    ("existing", Operation::Update),
    ("comment", Operation::Comment),
];

/// Map a configuration group name to its operation.
pub fn group_to_operation(group: &str) -> Result<Operation, ConfigError> {
    GROUP_TO_OPERATION
        .iter()
        .find(|(name, _)| *name == group)
        .map(|(_, operation)| *operation)
        .ok_or_else(|| ConfigError::UnsupportedStepGroup(group.to_string()))
}

/// The collaborators a step is allowed to use.
///
/// The executor only hands a step the collaborators it declares here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepRequirements {
    pub parameters: bool,
    pub bugzilla: bool,
    pub jira: bool,
}

impl StepRequirements {
    pub const NONE: Self = Self {
        parameters: false,
        bugzilla: false,
        jira: false,
    };

    #[must_use]
    pub const fn with_parameters(self) -> Self {
        Self {
            parameters: true,
            ..self
        }
    }

    #[must_use]
    pub const fn with_bugzilla(self) -> Self {
        Self {
            bugzilla: true,
            ..self
        }
    }

    #[must_use]
    pub const fn with_jira(self) -> Self {
        Self { jira: true, ..self }
    }

    /// Names of the declared collaborators, for display.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.parameters {
            names.push("parameters");
        }
        if self.bugzilla {
            names.push("bugzilla");
        }
        if self.jira {
            names.push("jira");
        }
        names
    }
}

/// Every step that can be referenced from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateIssue,
    AddLinkToBugzilla,
    AddLinkToJira,
    UpdateIssueSummary,
    MaybeAssignJiraUser,
    MaybeUpdateIssueStatus,
    MaybeUpdateIssueResolution,
    SyncWhiteboardLabels,
    CreateComment,
}

impl Step {
    pub const ALL: [Self; 9] = [
        Self::CreateIssue,
        Self::AddLinkToBugzilla,
        Self::AddLinkToJira,
        Self::UpdateIssueSummary,
        Self::MaybeAssignJiraUser,
        Self::MaybeUpdateIssueStatus,
        Self::MaybeUpdateIssueResolution,
        Self::SyncWhiteboardLabels,
        Self::CreateComment,
    ];

    /// The configuration name of the step.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateIssue => "create_issue",
            Self::AddLinkToBugzilla => "add_link_to_bugzilla",
            Self::AddLinkToJira => "add_link_to_jira",
            Self::UpdateIssueSummary => "update_issue_summary",
            Self::MaybeAssignJiraUser => "maybe_assign_jira_user",
            Self::MaybeUpdateIssueStatus => "maybe_update_issue_status",
            Self::MaybeUpdateIssueResolution => "maybe_update_issue_resolution",
            Self::SyncWhiteboardLabels => "sync_whiteboard_labels",
            Self::CreateComment => "create_comment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.name() == name)
    }

    /// The collaborators this step touches.
    pub const fn requirements(self) -> StepRequirements {
        let none = StepRequirements::NONE;
        match self {
            Self::CreateIssue => none.with_parameters().with_jira(),
            Self::AddLinkToBugzilla | Self::AddLinkToJira => none.with_bugzilla().with_jira(),
            Self::UpdateIssueSummary | Self::MaybeAssignJiraUser | Self::CreateComment => {
                none.with_jira()
            }
            Self::MaybeUpdateIssueStatus
            | Self::MaybeUpdateIssueResolution
            | Self::SyncWhiteboardLabels => none.with_parameters().with_jira(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown step '{s}'"))
    }
}

/// Resolved steps keyed by the operation they run for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepsByOperation {
    steps: HashMap<Operation, Vec<Step>>,
}

impl StepsByOperation {
    /// Resolve `(group, step names)` pairs.
    ///
    /// Fails on the first unsupported group or unknown step name.
    pub fn from_groups<'a, I>(groups: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut steps = HashMap::new();
        for (group, names) in groups {
            let operation = group_to_operation(group)?;
            let resolved = names
                .iter()
                .map(|name| {
                    Step::from_name(name).ok_or_else(|| ConfigError::UnknownStep {
                        group: group.to_string(),
                        step: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            steps.insert(operation, resolved);
        }
        Ok(Self { steps })
    }

    /// Steps to run for `operation`; empty for operations without a group.
    pub fn steps_for(&self, operation: Operation) -> &[Step] {
        self.steps
            .get(&operation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl TryFrom<&ActionSteps> for StepsByOperation {
    type Error = ConfigError;

    fn try_from(steps: &ActionSteps) -> Result<Self, Self::Error> {
        Self::from_groups(steps.groups())
    }
}
