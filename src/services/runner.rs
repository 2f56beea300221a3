//! Request dispatch: from a webhook request to an executed action.
//!
//! The runner validates the request, resolves the action from the bug's
//! whiteboard, classifies the operation and hands the context to the
//! [`Executor`]. Every reason to skip a request is reported as
//! [`RunnerError::Ignored`]; anything else propagates unchanged.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument};

use crate::domain::errors::{RunnerError, RunnerResult};
use crate::domain::models::action::Actions;
use crate::domain::models::context::{ActionContext, ActionResult, Operation, RunnerContext};
use crate::domain::models::event::{EventTarget, WebhookRequest};
use crate::domain::models::jira::{JiraContext, JiraIssue};
use crate::domain::ports::{BugzillaService, JiraService, MetricsSink};
use crate::services::executor::Executor;
use crate::services::metrics;

/// What is known about the Jira issue a bug links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedIssue {
    /// The bug has no see-also link into the action's project.
    None,
    /// The bug links to this key, but Jira did not return the issue.
    Unreadable(String),
    /// The linked issue as read from Jira.
    Found(JiraIssue),
}

/// Decide the operation for an event.
///
/// Never returns [`Operation::Ignore`]: requests that classify as ignored
/// come back as [`RunnerError::Ignored`] with the reason.
pub fn classify(
    target: &EventTarget,
    linked_issue: &LinkedIssue,
    project_key: &str,
) -> RunnerResult<Operation> {
    let operation = match (linked_issue, target) {
        (LinkedIssue::None, EventTarget::Bug) => Operation::Create,
        (LinkedIssue::None, _) => Operation::Ignore,
        (LinkedIssue::Unreadable(key), _) => {
            return Err(RunnerError::ignored(format!(
                "ignore unreadable issue {key}"
            )));
        }
        (LinkedIssue::Found(issue), _) if issue.project_key != project_key => {
            return Err(RunnerError::ignored(format!(
                "ignore linked project '{}' (!='{project_key}')",
                issue.project_key
            )));
        }
        (LinkedIssue::Found(_), EventTarget::Bug) => Operation::Update,
        (LinkedIssue::Found(_), EventTarget::Comment) => Operation::Comment,
        (LinkedIssue::Found(_), EventTarget::Other(_)) => Operation::Ignore,
    };

    if operation == Operation::Ignore {
        return Err(RunnerError::ignored(format!(
            "ignore event target '{target}'"
        )));
    }
    Ok(operation)
}

/// Executes the configured action for incoming webhook requests.
///
/// Collaborators are injected once at startup and shared by all requests.
#[derive(Clone)]
pub struct Runner {
    bugzilla: Arc<dyn BugzillaService>,
    jira: Arc<dyn JiraService>,
    metrics: Arc<dyn MetricsSink>,
}

impl Runner {
    pub fn new(
        bugzilla: Arc<dyn BugzillaService>,
        jira: Arc<dyn JiraService>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            bugzilla,
            jira,
            metrics,
        }
    }

    /// Execute the action matching `request`.
    ///
    /// Returns the responses of the executed steps, or
    /// [`RunnerError::Ignored`] when the request does not apply.
    #[instrument(skip_all, fields(rid = %request.rid, bug_id = request.bug.id))]
    pub async fn execute_action(
        &self,
        request: &WebhookRequest,
        actions: &Actions,
    ) -> RunnerResult<ActionResult> {
        let started = Instant::now();
        let runner_context = RunnerContext::new(
            request.rid.clone(),
            request.bug.clone(),
            request.event.clone(),
            Operation::Handle,
        );

        let result = self.dispatch(request, actions, runner_context.clone()).await;
        self.metrics
            .timing(metrics::EXECUTION_TIMER, started.elapsed());

        match &result {
            Ok(_) => self.metrics.incr(metrics::PROCESSED),
            Err(RunnerError::Ignored(reason)) => {
                info!(
                    context = %runner_context.with_operation(Operation::Ignore).log_json(),
                    "Ignore incoming request: {reason}"
                );
                self.metrics.incr(metrics::IGNORED);
            }
            Err(_) => {}
        }
        result
    }

    async fn dispatch(
        &self,
        request: &WebhookRequest,
        actions: &Actions,
        runner_context: RunnerContext,
    ) -> RunnerResult<ActionResult> {
        let event = &request.event;
        if request.bug.is_private {
            return Err(RunnerError::ignored("private bugs are not supported"));
        }

        debug!(context = %runner_context.log_json(), "Handling incoming request");

        let bug = match self.bugzilla.refresh_bug_data(&request.bug).await {
            Ok(bug) => bug,
            Err(err) => {
                error!(context = %runner_context.log_json(), "Failed to get bug: {err}");
                return Err(RunnerError::ignored("bug not accessible or bugzilla down"));
            }
        };
        let runner_context = runner_context.with_bug(bug.clone());

        let action = bug.lookup_action(actions).map_err(|err| {
            RunnerError::ignored(format!("no bug whiteboard matching action tags: {err}"))
        })?;
        let runner_context = runner_context.with_action(action.clone());

        let project_key = action.jira_project_key();
        let linked_issue_key = bug.extract_from_see_also(project_key);

        let context = ActionContext::new(
            action.clone(),
            request.rid.clone(),
            bug.clone(),
            event.clone(),
            Operation::Ignore,
            JiraContext::new(project_key, linked_issue_key.clone()),
        )
        .with_extra_defaults(action.parameters.as_extra());

        let linked_issue = match linked_issue_key {
            None => LinkedIssue::None,
            Some(key) => match self.jira.get_issue(&context, &key).await? {
                Some(issue) => LinkedIssue::Found(issue),
                None => LinkedIssue::Unreadable(key),
            },
        };

        let operation = classify(&event.target, &linked_issue, project_key)?;
        let mut context = context.with_operation(operation);
        if operation == Operation::Update {
            let changed_fields = event.changed_fields().join(", ");
            context = context.with_extra_defaults(
                [("changed_fields".to_string(), changed_fields)].into(),
            );
        }

        info!(
            context = %runner_context.with_operation(Operation::Execute).log_json(),
            "Execute action '{}' for Bug {}",
            action.whiteboard_tag,
            bug.id
        );

        let executor = Executor::new(
            action,
            Arc::clone(&self.bugzilla),
            Arc::clone(&self.jira),
            Arc::clone(&self.metrics),
        )?;
        let (handled, details) = executor.run(context).await?;

        let outcome = if handled {
            Operation::Success
        } else {
            Operation::Ignore
        };
        info!(
            context = %runner_context.with_operation(outcome).log_json(),
            "Action '{}' executed successfully for Bug {}",
            action.whiteboard_tag,
            bug.id
        );
        Ok(details)
    }
}
