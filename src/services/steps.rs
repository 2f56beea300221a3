//! Step implementations.
//!
//! Each step takes the context by value and returns the updated context.
//! Steps reach Bugzilla and Jira only through [`StepCollaborators`], which
//! holds exactly the collaborators the step declares in
//! [`Step::requirements`].

use serde_json::Value;
use tracing::debug;

use crate::domain::errors::{ServiceError, StepError};
use crate::domain::models::action::{ActionParams, LabelsBrackets};
use crate::domain::models::bug::parse_whiteboard;
use crate::domain::models::context::{ActionContext, Operation};
use crate::domain::models::jira::NewIssue;
use crate::domain::models::step::Step;
use crate::domain::ports::{BugzillaService, JiraService};

/// Jira rejects summaries longer than this.
pub const JIRA_SUMMARY_LIMIT: usize = 255;

/// Jira rejects descriptions and comments longer than this.
pub const JIRA_DESCRIPTION_LIMIT: usize = 32_767;

pub type StepResult = Result<ActionContext, StepError>;

/// The collaborators handed to one step invocation.
#[derive(Clone, Copy)]
pub struct StepCollaborators<'a> {
    step: Step,
    parameters: Option<&'a ActionParams>,
    bugzilla: Option<&'a dyn BugzillaService>,
    jira: Option<&'a dyn JiraService>,
}

impl<'a> StepCollaborators<'a> {
    /// Keep only the collaborators `step` declares.
    pub fn resolve(
        step: Step,
        parameters: &'a ActionParams,
        bugzilla: &'a dyn BugzillaService,
        jira: &'a dyn JiraService,
    ) -> Self {
        let requirements = step.requirements();
        Self {
            step,
            parameters: requirements.parameters.then_some(parameters),
            bugzilla: requirements.bugzilla.then_some(bugzilla),
            jira: requirements.jira.then_some(jira),
        }
    }

    pub fn parameters(&self) -> Result<&'a ActionParams, StepError> {
        self.parameters.ok_or(self.missing("parameters"))
    }

    pub fn bugzilla(&self) -> Result<&'a dyn BugzillaService, StepError> {
        self.bugzilla.ok_or(self.missing("bugzilla"))
    }

    pub fn jira(&self) -> Result<&'a dyn JiraService, StepError> {
        self.jira.ok_or(self.missing("jira"))
    }

    const fn missing(&self, collaborator: &'static str) -> StepError {
        StepError::MissingCollaborator {
            step: self.step.name(),
            collaborator,
        }
    }
}

/// Run `step` against `context`.
pub async fn run_step(
    step: Step,
    context: ActionContext,
    deps: &StepCollaborators<'_>,
) -> StepResult {
    match step {
        Step::CreateIssue => create_issue(context, deps).await,
        Step::AddLinkToBugzilla => add_link_to_bugzilla(context, deps).await,
        Step::AddLinkToJira => add_link_to_jira(context, deps).await,
        Step::UpdateIssueSummary => update_issue_summary(context, deps).await,
        Step::MaybeAssignJiraUser => maybe_assign_jira_user(context, deps).await,
        Step::MaybeUpdateIssueStatus => maybe_update_issue_status(context, deps).await,
        Step::MaybeUpdateIssueResolution => maybe_update_issue_resolution(context, deps).await,
        Step::SyncWhiteboardLabels => sync_whiteboard_labels(context, deps).await,
        Step::CreateComment => create_comment(context, deps).await,
    }
}

fn linked_issue(context: &ActionContext) -> Result<String, StepError> {
    context
        .jira()
        .issue
        .clone()
        .ok_or_else(|| StepError::Failed("no Jira issue linked to this bug".to_string()))
}

/// On updates, a step only acts when one of `fields` changed.
fn skip_unchanged(context: &ActionContext, fields: &[&str]) -> bool {
    context.operation() == Operation::Update
        && !fields.iter().any(|field| context.event().has_changed(field))
}

/// Truncate to at most `limit` characters.
pub fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Jira labels for whiteboard entries; labels cannot contain spaces.
pub fn whiteboard_labels(entries: &[String], brackets: LabelsBrackets) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.split_whitespace().collect::<Vec<_>>().join("."))
        .flat_map(|label| match brackets {
            LabelsBrackets::No => vec![label],
            LabelsBrackets::Yes => vec![format!("[{label}]")],
            LabelsBrackets::Both => vec![label.clone(), format!("[{label}]")],
        })
        .collect()
}

async fn create_issue(context: ActionContext, deps: &StepCollaborators<'_>) -> StepResult {
    let parameters = deps.parameters()?;
    let jira = deps.jira()?;

    let bug = context.bug();
    let description = bug
        .comment
        .as_ref()
        .and_then(|comment| comment.body.as_deref())
        .unwrap_or_default();
    let issue = NewIssue {
        project_key: context.jira().project.clone(),
        summary: truncate(bug.summary.as_deref().unwrap_or_default(), JIRA_SUMMARY_LIMIT),
        description: truncate(description, JIRA_DESCRIPTION_LIMIT),
        issue_type: parameters.issue_type_for(bug.bug_type.as_deref()),
        components: parameters.jira_components.clone(),
    };

    let response = jira.create_issue(&context, &issue).await?;
    let issue_key = response
        .get("key")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::InvalidResponse {
            service: "jira",
            message: "create issue response has no 'key'".to_string(),
        })?;

    debug!(rid = %context.rid(), issue = %issue_key, "Jira issue created");
    Ok(context.with_jira_issue(issue_key).with_responses([response]))
}

async fn add_link_to_bugzilla(context: ActionContext, deps: &StepCollaborators<'_>) -> StepResult {
    let bugzilla = deps.bugzilla()?;
    let jira = deps.jira()?;
    let issue_key = linked_issue(&context)?;

    let url = jira.issue_url(&issue_key);
    if context.bug().see_also.contains(&url) {
        debug!(rid = %context.rid(), url = %url, "Bug already links to the issue");
        return Ok(context);
    }

    let response = bugzilla.add_see_also(context.bug().id, &url).await?;
    Ok(context.with_responses([response]))
}

async fn add_link_to_jira(context: ActionContext, deps: &StepCollaborators<'_>) -> StepResult {
    let bugzilla = deps.bugzilla()?;
    let jira = deps.jira()?;
    let issue_key = linked_issue(&context)?;

    let bug_id = context.bug().id;
    let url = bugzilla.bug_url(bug_id);
    let title = format!("Bugzilla Bug {bug_id}");
    let response = jira
        .create_remote_link(&context, &issue_key, &url, &title)
        .await?;
    Ok(context.with_responses([response]))
}

async fn update_issue_summary(context: ActionContext, deps: &StepCollaborators<'_>) -> StepResult {
    let jira = deps.jira()?;
    if skip_unchanged(&context, &["summary"]) {
        return Ok(context);
    }
    let issue_key = linked_issue(&context)?;

    let summary = truncate(
        context.bug().summary.as_deref().unwrap_or_default(),
        JIRA_SUMMARY_LIMIT,
    );
    let response = jira
        .update_issue_summary(&context, &issue_key, &summary)
        .await?;
    Ok(context.with_responses([response]))
}

async fn maybe_assign_jira_user(
    context: ActionContext,
    deps: &StepCollaborators<'_>,
) -> StepResult {
    let jira = deps.jira()?;
    if skip_unchanged(&context, &["assigned_to"]) {
        return Ok(context);
    }
    let issue_key = linked_issue(&context)?;

    if !context.bug().is_assigned() {
        if context.operation() == Operation::Create {
            return Ok(context);
        }
        let response = jira.assign_issue(&context, &issue_key, None).await?;
        return Ok(context.with_responses([response]));
    }

    let email = context.bug().assigned_to.clone().unwrap_or_default();
    if let Some(account_id) = jira.find_user_by_email(&email).await? {
        let response = jira
            .assign_issue(&context, &issue_key, Some(&account_id))
            .await?;
        return Ok(context.with_responses([response]));
    }

    // Unknown user: clear a now-stale assignee, then report the step as incomplete.
    let context = if context.operation() == Operation::Update {
        let response = jira.assign_issue(&context, &issue_key, None).await?;
        context.with_responses([response])
    } else {
        context
    };
    Err(StepError::incomplete(
        context,
        format!("no Jira user found for {email}"),
    ))
}

async fn maybe_update_issue_status(
    context: ActionContext,
    deps: &StepCollaborators<'_>,
) -> StepResult {
    let parameters = deps.parameters()?;
    let jira = deps.jira()?;
    if parameters.status_map.is_empty() || skip_unchanged(&context, &["status", "resolution"]) {
        return Ok(context);
    }
    let issue_key = linked_issue(&context)?;

    let bug = context.bug();
    let bz_status = bug
        .resolution
        .as_deref()
        .filter(|resolution| !resolution.is_empty())
        .or(bug.status.as_deref())
        .unwrap_or_default()
        .to_string();

    let Some(jira_status) = parameters.status_map.get(&bz_status) else {
        return Err(StepError::incomplete(
            context,
            format!("Bug status {bz_status:?} was not in the status map"),
        ));
    };

    let response = jira
        .transition_issue(&context, &issue_key, jira_status)
        .await?;
    Ok(context.with_responses([response]))
}

async fn maybe_update_issue_resolution(
    context: ActionContext,
    deps: &StepCollaborators<'_>,
) -> StepResult {
    let parameters = deps.parameters()?;
    let jira = deps.jira()?;
    if parameters.resolution_map.is_empty() || skip_unchanged(&context, &["resolution"]) {
        return Ok(context);
    }
    let issue_key = linked_issue(&context)?;

    let bz_resolution = context.bug().resolution.clone().unwrap_or_default();
    if bz_resolution.is_empty() {
        return Ok(context);
    }

    let Some(jira_resolution) = parameters.resolution_map.get(&bz_resolution) else {
        return Err(StepError::incomplete(
            context,
            format!("Bug resolution {bz_resolution:?} was not in the resolution map"),
        ));
    };

    let response = jira
        .update_issue_resolution(&context, &issue_key, jira_resolution)
        .await?;
    Ok(context.with_responses([response]))
}

async fn sync_whiteboard_labels(
    context: ActionContext,
    deps: &StepCollaborators<'_>,
) -> StepResult {
    let parameters = deps.parameters()?;
    let jira = deps.jira()?;
    if skip_unchanged(&context, &["whiteboard"]) {
        return Ok(context);
    }
    let issue_key = linked_issue(&context)?;

    let mut add = vec!["bugzilla".to_string()];
    add.extend(whiteboard_labels(
        &context.bug().whiteboard_entries(),
        parameters.labels_brackets,
    ));

    let remove: Vec<String> = context
        .event()
        .change_for("whiteboard")
        .map(|change| {
            whiteboard_labels(&parse_whiteboard(&change.removed), parameters.labels_brackets)
        })
        .unwrap_or_default()
        .into_iter()
        .filter(|label| !add.contains(label))
        .collect();

    let response = jira
        .update_issue_labels(&context, &issue_key, &add, &remove)
        .await?;
    Ok(context.with_responses([response]))
}

async fn create_comment(context: ActionContext, deps: &StepCollaborators<'_>) -> StepResult {
    let jira = deps.jira()?;
    let issue_key = linked_issue(&context)?;

    let Some(comment) = context.bug().comment.as_ref() else {
        debug!(rid = %context.rid(), "No comment in the event payload");
        return Ok(context);
    };
    if comment.is_private {
        debug!(rid = %context.rid(), "Private comments are not copied to Jira");
        return Ok(context);
    }

    let author = context
        .event()
        .user
        .as_ref()
        .map_or("unknown", |user| user.login.as_str());
    let body = format!(
        "*{author}* commented: \n{{quote}}\n{}\n{{quote}}",
        comment.body.as_deref().unwrap_or_default()
    );

    let response = jira
        .add_comment(&context, &issue_key, &truncate(&body, JIRA_DESCRIPTION_LIMIT))
        .await?;
    Ok(context.with_responses([response]))
}
