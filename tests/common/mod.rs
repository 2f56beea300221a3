//! Common test utilities for integration tests
//!
//! In-memory Bugzilla and Jira services that record every call, plus
//! fixtures for actions, bugs and webhook requests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use jbi::domain::errors::{ServiceError, ServiceResult};
use jbi::domain::models::{
    Action, ActionContext, ActionParams, Actions, Bug, BugComment, WebhookEvent,
    WebhookEventChange, WebhookRequest, WebhookUser,
};
use jbi::domain::models::jira::{JiraIssue, NewIssue};
use jbi::{BugzillaService, InMemoryMetrics, JiraService, Runner};

pub const BUGZILLA_URL: &str = "https://bugzilla.mozilla.org";
pub const JIRA_URL: &str = "https://mozilla.atlassian.net";

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Bugzilla fake: returns the bug it is given, or fails on demand.
#[derive(Default)]
pub struct FakeBugzilla {
    refreshed: Option<Bug>,
    fail_refresh: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeBugzilla {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `bug` from `refresh_bug_data` instead of the payload's bug.
    pub fn refreshing_to(mut self, bug: Bug) -> Self {
        self.refreshed = Some(bug);
        self
    }

    pub fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BugzillaService for FakeBugzilla {
    async fn refresh_bug_data(&self, bug: &Bug) -> ServiceResult<Bug> {
        self.record(format!("refresh_bug_data:{}", bug.id));
        if self.fail_refresh {
            return Err(ServiceError::RequestFailed {
                service: "bugzilla",
                message: "503 Service Unavailable".to_string(),
            });
        }
        Ok(self.refreshed.clone().unwrap_or_else(|| bug.clone()))
    }

    async fn add_see_also(&self, bug_id: u64, url: &str) -> ServiceResult<Value> {
        self.record(format!("add_see_also:{bug_id}:{url}"));
        Ok(json!({"bugs": [{"id": bug_id, "changes": {"see_also": {"added": url}}}]}))
    }

    fn bug_url(&self, bug_id: u64) -> String {
        format!("{BUGZILLA_URL}/show_bug.cgi?id={bug_id}")
    }
}

/// Jira fake: knows a fixed set of issues and users, and records each
/// call with the context it was made with.
pub struct FakeJira {
    issues: HashMap<String, JiraIssue>,
    users: HashMap<String, String>,
    fail_on: Option<&'static str>,
    next_key: String,
    calls: Mutex<Vec<String>>,
    contexts: Mutex<Vec<ActionContext>>,
}

impl Default for FakeJira {
    fn default() -> Self {
        Self {
            issues: HashMap::new(),
            users: HashMap::new(),
            fail_on: None,
            next_key: "JBI-1".to_string(),
            calls: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }
}

impl FakeJira {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(mut self, key: &str, project_key: &str) -> Self {
        self.issues.insert(
            key.to_string(),
            JiraIssue {
                key: key.to_string(),
                project_key: project_key.to_string(),
                summary: None,
                status: None,
            },
        );
        self
    }

    pub fn with_user(mut self, email: &str, account_id: &str) -> Self {
        self.users.insert(email.to_string(), account_id.to_string());
        self
    }

    /// Make `method` fail with a request error.
    pub fn failing_on(mut self, method: &'static str) -> Self {
        self.fail_on = Some(method);
        self
    }

    /// Names of the methods called, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, method: &str) -> bool {
        self.calls().iter().any(|call| call == method)
    }

    /// Contexts passed to the calls that change Jira, in order.
    pub fn contexts(&self) -> Vec<ActionContext> {
        self.contexts.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, context: Option<&ActionContext>) -> ServiceResult<()> {
        self.calls.lock().unwrap().push(method.to_string());
        if let Some(context) = context {
            self.contexts.lock().unwrap().push(context.clone());
        }
        if self.fail_on == Some(method) {
            return Err(ServiceError::RequestFailed {
                service: "jira",
                message: format!("{method}: 500 Internal Server Error"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl JiraService for FakeJira {
    async fn get_issue(
        &self,
        _context: &ActionContext,
        issue_key: &str,
    ) -> ServiceResult<Option<JiraIssue>> {
        self.record("get_issue", None)?;
        Ok(self.issues.get(issue_key).cloned())
    }

    async fn create_issue(
        &self,
        context: &ActionContext,
        issue: &NewIssue,
    ) -> ServiceResult<Value> {
        self.record("create_issue", Some(context))?;
        Ok(json!({
            "key": self.next_key,
            "fields": {"summary": issue.summary, "issuetype": issue.issue_type}
        }))
    }

    async fn update_issue_summary(
        &self,
        context: &ActionContext,
        issue_key: &str,
        summary: &str,
    ) -> ServiceResult<Value> {
        self.record("update_issue_summary", Some(context))?;
        Ok(json!({"key": issue_key, "summary": summary}))
    }

    async fn create_remote_link(
        &self,
        context: &ActionContext,
        issue_key: &str,
        url: &str,
        title: &str,
    ) -> ServiceResult<Value> {
        self.record("create_remote_link", Some(context))?;
        Ok(json!({"key": issue_key, "url": url, "title": title}))
    }

    async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<String>> {
        self.record("find_user_by_email", None)?;
        Ok(self.users.get(email).cloned())
    }

    async fn assign_issue(
        &self,
        context: &ActionContext,
        issue_key: &str,
        account_id: Option<&str>,
    ) -> ServiceResult<Value> {
        self.record("assign_issue", Some(context))?;
        Ok(json!({"key": issue_key, "assignee": account_id}))
    }

    async fn transition_issue(
        &self,
        context: &ActionContext,
        issue_key: &str,
        status: &str,
    ) -> ServiceResult<Value> {
        self.record("transition_issue", Some(context))?;
        Ok(json!({"key": issue_key, "status": status}))
    }

    async fn update_issue_resolution(
        &self,
        context: &ActionContext,
        issue_key: &str,
        resolution: &str,
    ) -> ServiceResult<Value> {
        self.record("update_issue_resolution", Some(context))?;
        Ok(json!({"key": issue_key, "resolution": resolution}))
    }

    async fn update_issue_labels(
        &self,
        context: &ActionContext,
        issue_key: &str,
        add: &[String],
        remove: &[String],
    ) -> ServiceResult<Value> {
        self.record("update_issue_labels", Some(context))?;
        Ok(json!({"key": issue_key, "add": add, "remove": remove}))
    }

    async fn add_comment(
        &self,
        context: &ActionContext,
        issue_key: &str,
        body: &str,
    ) -> ServiceResult<Value> {
        self.record("add_comment", Some(context))?;
        Ok(json!({"key": issue_key, "body": body}))
    }

    fn issue_url(&self, issue_key: &str) -> String {
        format!("{JIRA_URL}/browse/{issue_key}")
    }
}

/// The `devtest` action, syncing to project `JBI` with the default steps.
pub fn devtest_action() -> Action {
    Action::new("devtest", ActionParams::new("JBI"))
}

pub fn actions() -> Actions {
    Actions::new(vec![devtest_action()]).unwrap()
}

/// An unassigned, public bug tagged `[devtest]`.
pub fn bug() -> Bug {
    let mut bug = Bug::new(654_321);
    bug.whiteboard = Some("[devtest]".to_string());
    bug.summary = Some("JBI Test".to_string());
    bug.status = Some("NEW".to_string());
    bug.bug_type = Some("defect".to_string());
    bug.assigned_to = Some("nobody@mozilla.org".to_string());
    bug
}

/// A bug linked to `issue_key` through its see-also field.
pub fn linked_bug(issue_key: &str) -> Bug {
    let mut bug = bug();
    bug.see_also = vec![format!("{JIRA_URL}/browse/{issue_key}")];
    bug
}

pub fn comment(body: &str, is_private: bool) -> BugComment {
    BugComment {
        id: Some(1),
        number: Some(1),
        body: Some(body.to_string()),
        is_private,
        creation_time: None,
    }
}

/// A `modify` event on `target` that changed `fields`.
pub fn event(target: &str, fields: &[&str]) -> WebhookEvent {
    let mut event = WebhookEvent::new("modify", target);
    event.user = Some(WebhookUser {
        id: 123_456,
        login: "nobody@mozilla.org".to_string(),
        real_name: Some("Nobody [ :nobody ]".to_string()),
    });
    if !fields.is_empty() {
        event.changes = Some(
            fields
                .iter()
                .map(|field| WebhookEventChange {
                    field: (*field).to_string(),
                    removed: String::new(),
                    added: "x".to_string(),
                })
                .collect(),
        );
    }
    event
}

pub fn request(target: &str, fields: &[&str], bug: Bug) -> WebhookRequest {
    WebhookRequest::new(event(target, fields), bug).with_rid("test-rid")
}

/// A runner over the given fakes, with in-memory metrics.
pub fn runner(
    bugzilla: &Arc<FakeBugzilla>,
    jira: &Arc<FakeJira>,
    metrics: &Arc<InMemoryMetrics>,
) -> Runner {
    Runner::new(bugzilla.clone(), jira.clone(), metrics.clone())
}
