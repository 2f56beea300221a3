//! Action configuration models.
//!
//! An [`Action`] ties a Bugzilla whiteboard tag to a Jira project and to
//! the steps to run for new bugs, existing bugs and comments. Actions are
//! loaded once at startup and never change afterwards.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::step::{group_to_operation, StepsByOperation};
use crate::domain::errors::ConfigError;

/// Default steps run when a bug without a linked issue is created or modified.
pub const DEFAULT_NEW_STEPS: &[&str] = &[
    "create_issue",
    "add_link_to_bugzilla",
    "add_link_to_jira",
    "maybe_assign_jira_user",
    "maybe_update_issue_status",
    "sync_whiteboard_labels",
];

/// Default steps run when a bug with a linked issue is modified.
pub const DEFAULT_EXISTING_STEPS: &[&str] = &[
    "update_issue_summary",
    "maybe_assign_jira_user",
    "maybe_update_issue_status",
    "sync_whiteboard_labels",
];

/// Default steps run when a comment is posted on a linked bug.
pub const DEFAULT_COMMENT_STEPS: &[&str] = &["create_comment"];

fn to_owned_steps(steps: &[&str]) -> Vec<String> {
    steps.iter().map(ToString::to_string).collect()
}

/// Step names grouped by `new`, `existing` and `comment`, as authored in
/// the configuration file.
///
/// Deserialization rejects any other group name; missing groups fall back
/// to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<String>>")]
pub struct ActionSteps {
    pub new: Vec<String>,
    pub existing: Vec<String>,
    pub comment: Vec<String>,
}

impl Default for ActionSteps {
    fn default() -> Self {
        Self {
            new: to_owned_steps(DEFAULT_NEW_STEPS),
            existing: to_owned_steps(DEFAULT_EXISTING_STEPS),
            comment: to_owned_steps(DEFAULT_COMMENT_STEPS),
        }
    }
}

impl ActionSteps {
    /// The three groups with their configuration names.
    pub fn groups(&self) -> [(&'static str, &[String]); 3] {
        [
            ("new", self.new.as_slice()),
            ("existing", self.existing.as_slice()),
            ("comment", self.comment.as_slice()),
        ]
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for ActionSteps {
    type Error = ConfigError;

    fn try_from(groups: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        let mut steps = Self::default();
        for (group, names) in groups {
            // Validates the group name before we pick a slot for it.
            group_to_operation(&group)?;
            match group.as_str() {
                "new" => steps.new = names,
                "existing" => steps.existing = names,
                _ => steps.comment = names,
            }
        }
        Ok(steps)
    }
}

/// How whiteboard entries are turned into Jira labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelsBrackets {
    /// `[foo]` becomes `foo`.
    #[default]
    No,
    /// `[foo]` becomes `[foo]`.
    Yes,
    /// `[foo]` becomes both `foo` and `[foo]`.
    Both,
}

impl LabelsBrackets {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
            Self::Both => "both",
        }
    }
}

fn default_issue_type_map() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("task".to_string(), "Task".to_string()),
        ("defect".to_string(), "Bug".to_string()),
    ])
}

/// Parameters passed to the steps of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParams {
    pub jira_project_key: String,
    #[serde(default)]
    pub steps: ActionSteps,
    #[serde(default)]
    pub jira_components: Vec<String>,
    #[serde(default)]
    pub status_map: BTreeMap<String, String>,
    #[serde(default)]
    pub resolution_map: BTreeMap<String, String>,
    #[serde(default = "default_issue_type_map")]
    pub issue_type_map: BTreeMap<String, String>,
    #[serde(default)]
    pub labels_brackets: LabelsBrackets,
}

impl ActionParams {
    pub fn new(jira_project_key: impl Into<String>) -> Self {
        Self {
            jira_project_key: jira_project_key.into(),
            steps: ActionSteps::default(),
            jira_components: Vec::new(),
            status_map: BTreeMap::new(),
            resolution_map: BTreeMap::new(),
            issue_type_map: default_issue_type_map(),
            labels_brackets: LabelsBrackets::default(),
        }
    }

    /// Jira issue type for a Bugzilla bug type, defaulting to `Task`.
    pub fn issue_type_for(&self, bug_type: Option<&str>) -> String {
        bug_type
            .and_then(|t| self.issue_type_map.get(t))
            .cloned()
            .unwrap_or_else(|| "Task".to_string())
    }

    /// Scalar parameters rendered as strings, used to seed context extras.
    pub fn as_extra(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("jira_project_key".to_string(), self.jira_project_key.clone()),
            ("jira_components".to_string(), self.jira_components.join(", ")),
            (
                "labels_brackets".to_string(),
                self.labels_brackets.as_str().to_string(),
            ),
        ])
    }
}

const fn default_true() -> bool {
    true
}

/// A configured action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub whiteboard_tag: String,
    #[serde(default)]
    pub bugzilla_user_id: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub parameters: ActionParams,
}

impl Action {
    pub fn new(whiteboard_tag: impl Into<String>, parameters: ActionParams) -> Self {
        Self {
            whiteboard_tag: whiteboard_tag.into(),
            bugzilla_user_id: None,
            description: String::new(),
            enabled: true,
            parameters,
        }
    }

    pub fn jira_project_key(&self) -> &str {
        &self.parameters.jira_project_key
    }
}

/// The validated set of configured actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Action>", into = "Vec<Action>")]
pub struct Actions {
    actions: Vec<Action>,
}

impl Actions {
    /// Validate and normalize a list of actions.
    ///
    /// Whiteboard tags are lower-cased and must be unique and non-empty,
    /// every action needs a project key, and every step group and name
    /// must resolve. Disabled actions are kept but never matched.
    pub fn new(actions: Vec<Action>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(actions.len());

        for mut action in actions {
            action.whiteboard_tag = action.whiteboard_tag.trim().to_lowercase();
            if action.whiteboard_tag.is_empty() {
                return Err(ConfigError::EmptyWhiteboardTag);
            }
            if !seen.insert(action.whiteboard_tag.clone()) {
                return Err(ConfigError::DuplicateWhiteboardTag(action.whiteboard_tag));
            }
            if action.parameters.jira_project_key.trim().is_empty() {
                return Err(ConfigError::EmptyProjectKey(action.whiteboard_tag));
            }
            StepsByOperation::try_from(&action.parameters.steps)?;
            normalized.push(action);
        }

        if !normalized.iter().any(|action| action.enabled) {
            return Err(ConfigError::NoActions);
        }

        Ok(Self {
            actions: normalized,
        })
    }

    /// Enabled actions, in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|action| action.enabled)
    }

    /// Look up an enabled action by its whiteboard tag.
    pub fn by_tag(&self, tag: &str) -> Option<&Action> {
        let tag = tag.to_lowercase();
        self.iter().find(|action| action.whiteboard_tag == tag)
    }

    pub fn tags(&self) -> Vec<&str> {
        self.iter().map(|action| action.whiteboard_tag.as_str()).collect()
    }

    /// All actions, including disabled ones.
    pub fn all(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<Vec<Action>> for Actions {
    type Error = ConfigError;

    fn try_from(actions: Vec<Action>) -> Result<Self, Self::Error> {
        Self::new(actions)
    }
}

impl From<Actions> for Vec<Action> {
    fn from(actions: Actions) -> Self {
        actions.actions
    }
}
