//! Jira port.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::ServiceResult;
use crate::domain::models::context::ActionContext;
use crate::domain::models::jira::{JiraIssue, NewIssue};

/// Port for the Jira REST API.
///
/// Calls that change Jira return the raw response, which the calling step
/// records in the context. The context is passed along so implementations
/// can log with the request's fields.
#[async_trait]
pub trait JiraService: Send + Sync {
    /// Fetch an issue; `None` when it does not exist or is not readable.
    async fn get_issue(
        &self,
        context: &ActionContext,
        issue_key: &str,
    ) -> ServiceResult<Option<JiraIssue>>;

    /// Create an issue. The response carries the new issue's `key`.
    async fn create_issue(&self, context: &ActionContext, issue: &NewIssue) -> ServiceResult<Value>;

    async fn update_issue_summary(
        &self,
        context: &ActionContext,
        issue_key: &str,
        summary: &str,
    ) -> ServiceResult<Value>;

    /// Link the issue back to a web page (the Bugzilla bug).
    async fn create_remote_link(
        &self,
        context: &ActionContext,
        issue_key: &str,
        url: &str,
        title: &str,
    ) -> ServiceResult<Value>;

    /// Resolve a Jira account id from an email address.
    async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<String>>;

    /// Assign the issue, or clear the assignee when `account_id` is `None`.
    async fn assign_issue(
        &self,
        context: &ActionContext,
        issue_key: &str,
        account_id: Option<&str>,
    ) -> ServiceResult<Value>;

    /// Move the issue to the workflow status named `status`.
    async fn transition_issue(
        &self,
        context: &ActionContext,
        issue_key: &str,
        status: &str,
    ) -> ServiceResult<Value>;

    async fn update_issue_resolution(
        &self,
        context: &ActionContext,
        issue_key: &str,
        resolution: &str,
    ) -> ServiceResult<Value>;

    async fn update_issue_labels(
        &self,
        context: &ActionContext,
        issue_key: &str,
        add: &[String],
        remove: &[String],
    ) -> ServiceResult<Value>;

    async fn add_comment(
        &self,
        context: &ActionContext,
        issue_key: &str,
        body: &str,
    ) -> ServiceResult<Value>;

    /// Browser URL of an issue.
    fn issue_url(&self, issue_key: &str) -> String;
}
