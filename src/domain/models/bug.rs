//! Bugzilla bug models.
//!
//! A [`Bug`] arrives embedded in a webhook payload and is refreshed from
//! Bugzilla once at the start of processing.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::action::{Action, Actions};
use crate::domain::errors::ActionNotFoundError;

/// Bugzilla's placeholder assignee for unassigned bugs.
pub const UNASSIGNED_EMAIL: &str = "nobody@mozilla.org";

static WHITEBOARD_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("valid whiteboard regex"));

/// A comment attached to a `comment` webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugComment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
}

/// A Bugzilla bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    pub id: u64,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default, rename = "type")]
    pub bug_type: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub whiteboard: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub see_also: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub comment: Option<BugComment>,
}

impl Bug {
    /// Create a minimal bug, mostly useful for tests and fixtures.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            is_private: false,
            bug_type: None,
            product: None,
            component: None,
            whiteboard: None,
            keywords: Vec::new(),
            status: None,
            resolution: None,
            see_also: Vec::new(),
            summary: None,
            assigned_to: None,
            comment: None,
        }
    }

    /// Whether someone other than the placeholder account owns the bug.
    pub fn is_assigned(&self) -> bool {
        self.assigned_to
            .as_deref()
            .is_some_and(|email| !email.is_empty() && email != UNASSIGNED_EMAIL)
    }

    /// Whiteboard entries with their original casing, e.g. `"[dom] [foo-bar]"`
    /// gives `["dom", "foo-bar"]`.
    pub fn whiteboard_entries(&self) -> Vec<String> {
        self.whiteboard
            .as_deref()
            .map(parse_whiteboard)
            .unwrap_or_default()
    }

    /// Lower-cased whiteboard entries, used for action matching.
    pub fn whiteboard_tags(&self) -> Vec<String> {
        self.whiteboard_entries()
            .into_iter()
            .map(|entry| entry.to_lowercase())
            .collect()
    }

    /// Find the first configured action whose tag appears on the whiteboard.
    ///
    /// An entry matches a tag when it equals it or starts with `"<tag>-"`.
    pub fn lookup_action<'a>(
        &self,
        actions: &'a Actions,
    ) -> Result<&'a Action, ActionNotFoundError> {
        let tags = self.whiteboard_tags();
        actions
            .iter()
            .find(|action| {
                let tag = action.whiteboard_tag.as_str();
                let prefix = format!("{tag}-");
                tags.iter()
                    .any(|entry| entry == tag || entry.starts_with(&prefix))
            })
            .ok_or_else(|| ActionNotFoundError(actions.tags().join(", ")))
    }

    /// Find the linked Jira issue key among the see-also URLs.
    ///
    /// Keys belonging to `project_key` are preferred; otherwise the first
    /// Jira link wins, so callers must still check the issue's project.
    pub fn extract_from_see_also(&self, project_key: &str) -> Option<String> {
        let candidates: Vec<String> = self
            .see_also
            .iter()
            .filter_map(|raw| jira_key_from_url(raw))
            .collect();

        let prefix = format!("{project_key}-");
        candidates
            .iter()
            .find(|key| key.starts_with(&prefix))
            .or_else(|| candidates.first())
            .cloned()
    }
}

/// Split a whiteboard string into its bracketed entries.
pub fn parse_whiteboard(whiteboard: &str) -> Vec<String> {
    WHITEBOARD_ENTRY
        .captures_iter(whiteboard)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn jira_key_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;
    if !(host.contains("jira") || host.contains("atlassian")) {
        return None;
    }

    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == "browse")?;
    let key = segments.next()?.trim();
    if key.contains('-') {
        Some(key.to_string())
    } else {
        None
    }
}
