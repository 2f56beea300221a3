//! Bugzilla webhook payload models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bug::Bug;

/// What the webhook event is about.
///
/// Bugzilla sends `bug` or `comment`; anything else is kept verbatim so
/// it can be reported when the request is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventTarget {
    Bug,
    Comment,
    Other(String),
}

impl EventTarget {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bug => "bug",
            Self::Comment => "comment",
            Self::Other(other) => other.as_str(),
        }
    }
}

impl From<String> for EventTarget {
    fn from(value: String) -> Self {
        match value.as_str() {
            "bug" => Self::Bug,
            "comment" => Self::Comment,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for EventTarget {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EventTarget> for String {
    fn from(value: EventTarget) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The Bugzilla user who triggered the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub real_name: Option<String>,
}

/// A single field change reported by a `modify` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEventChange {
    pub field: String,
    #[serde(default)]
    pub removed: String,
    #[serde(default)]
    pub added: String,
}

/// The `event` section of a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub action: String,
    pub target: EventTarget,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<WebhookUser>,
    #[serde(default)]
    pub changes: Option<Vec<WebhookEventChange>>,
    #[serde(default)]
    pub routing_key: Option<String>,
}

impl WebhookEvent {
    pub fn new(action: impl Into<String>, target: impl Into<EventTarget>) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
            time: None,
            user: None,
            changes: None,
            routing_key: None,
        }
    }

    /// Names of the fields changed by this event, in payload order.
    pub fn changed_fields(&self) -> Vec<String> {
        self.changes
            .iter()
            .flatten()
            .map(|change| change.field.clone())
            .collect()
    }

    /// The change record for `field`, if this event touched it.
    pub fn change_for(&self, field: &str) -> Option<&WebhookEventChange> {
        self.changes
            .iter()
            .flatten()
            .find(|change| change.field == field)
    }

    pub fn has_changed(&self, field: &str) -> bool {
        self.change_for(field).is_some()
    }
}

fn generate_rid() -> String {
    Uuid::new_v4().to_string()
}

/// A full webhook request as posted by Bugzilla.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub webhook_id: u64,
    pub webhook_name: String,
    pub event: WebhookEvent,
    pub bug: Bug,
    /// Request id used to correlate log lines; generated when absent.
    #[serde(default = "generate_rid")]
    pub rid: String,
}

impl WebhookRequest {
    pub fn new(event: WebhookEvent, bug: Bug) -> Self {
        Self {
            webhook_id: 0,
            webhook_name: String::new(),
            event,
            bug,
            rid: generate_rid(),
        }
    }

    /// Replace the request id, e.g. with the transport's `X-Request-Id`.
    #[must_use]
    pub fn with_rid(self, rid: impl Into<String>) -> Self {
        Self {
            rid: rid.into(),
            ..self
        }
    }
}
