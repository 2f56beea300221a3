//! Implementation of the `jbi classify` command.
//!
//! An offline dry run: nothing is fetched from Bugzilla or Jira. A linked
//! issue is assumed readable, and its project is taken from the key prefix.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::RunnerError;
use crate::domain::models::action::Actions;
use crate::domain::models::config::Settings;
use crate::domain::models::context::Operation;
use crate::domain::models::event::WebhookRequest;
use crate::domain::models::jira::JiraIssue;
use crate::domain::models::step::StepsByOperation;
use crate::infrastructure::config::ConfigLoader;
use crate::services::runner::{classify, LinkedIssue};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Webhook payload (JSON) as posted by Bugzilla
    #[arg(short, long)]
    pub payload: PathBuf,

    /// Actions file to use instead of the one named in the settings
    #[arg(short, long)]
    pub actions: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
pub struct ClassifyOutput {
    pub rid: String,
    pub bug_id: u64,
    pub event_target: String,
    pub action: Option<String>,
    pub linked_issue: Option<String>,
    pub operation: Option<Operation>,
    pub steps: Vec<&'static str>,
    pub ignored: Option<String>,
}

impl ClassifyOutput {
    pub fn from_request(request: &WebhookRequest, actions: &Actions) -> Result<Self> {
        let mut result = Self {
            rid: request.rid.clone(),
            bug_id: request.bug.id,
            event_target: request.event.target.to_string(),
            ..Self::default()
        };

        if request.bug.is_private {
            result.ignored = Some("private bugs are not supported".to_string());
            return Ok(result);
        }

        let action = match request.bug.lookup_action(actions) {
            Ok(action) => action,
            Err(err) => {
                result.ignored = Some(format!("no bug whiteboard matching action tags: {err}"));
                return Ok(result);
            }
        };
        result.action = Some(action.whiteboard_tag.clone());

        let project_key = action.jira_project_key();
        result.linked_issue = request.bug.extract_from_see_also(project_key);
        let linked = result
            .linked_issue
            .as_ref()
            .map_or(LinkedIssue::None, |key| {
                LinkedIssue::Found(JiraIssue {
                    key: key.clone(),
                    project_key: project_of(key).to_string(),
                    summary: None,
                    status: None,
                })
            });

        match classify(&request.event.target, &linked, project_key) {
            Ok(operation) => {
                let steps = StepsByOperation::try_from(&action.parameters.steps)?;
                result.steps = steps.steps_for(operation).iter().map(|s| s.name()).collect();
                result.operation = Some(operation);
            }
            Err(RunnerError::Ignored(reason)) => result.ignored = Some(reason),
            Err(err) => return Err(err.into()),
        }
        Ok(result)
    }
}

/// Project part of an issue key (`JBI` for `JBI-234`).
fn project_of(key: &str) -> &str {
    key.rsplit_once('-').map_or(key, |(project, _)| project)
}

impl CommandOutput for ClassifyOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Bug {} ({} event, rid {})",
            self.bug_id, self.event_target, self.rid
        )];
        if let Some(action) = &self.action {
            lines.push(format!("Action:       {action}"));
        }
        if let Some(issue) = &self.linked_issue {
            lines.push(format!("Linked issue: {issue}"));
        }
        if let Some(operation) = self.operation {
            lines.push(format!("Operation:    {operation}"));
            lines.push(format!("Steps:        {}", self.steps.join(", ")));
        }
        if let Some(reason) = &self.ignored {
            lines.push(format!("Ignored:      {reason}"));
        }
        lines.join("\n")
    }
}

pub fn execute(args: ClassifyArgs, settings: &Settings, json_mode: bool) -> Result<()> {
    let actions_file = args.actions.unwrap_or_else(|| settings.actions_file.clone());
    let actions = ConfigLoader::load_actions(&actions_file)
        .with_context(|| format!("Invalid actions file {}", actions_file.display()))?;

    let payload = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("Failed to read {}", args.payload.display()))?;
    let request: WebhookRequest =
        serde_json::from_str(&payload).context("Payload is not a Bugzilla webhook request")?;

    output(&ClassifyOutput::from_request(&request, &actions)?, json_mode);
    Ok(())
}
