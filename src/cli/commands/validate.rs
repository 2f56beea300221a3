//! Implementation of the `jbi validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::action::Actions;
use crate::domain::models::config::Settings;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Actions file to check instead of the one named in the settings
    #[arg(short, long)]
    pub actions: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ActionSummary {
    pub whiteboard_tag: String,
    pub jira_project_key: String,
    pub enabled: bool,
    pub new: Vec<String>,
    pub existing: Vec<String>,
    pub comment: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub env: String,
    pub actions_file: PathBuf,
    pub actions: Vec<ActionSummary>,
}

impl ValidateOutput {
    pub fn new(settings: &Settings, actions_file: PathBuf, actions: &Actions) -> Self {
        let actions = actions
            .all()
            .iter()
            .map(|action| {
                let steps = &action.parameters.steps;
                ActionSummary {
                    whiteboard_tag: action.whiteboard_tag.clone(),
                    jira_project_key: action.jira_project_key().to_string(),
                    enabled: action.enabled,
                    new: steps.new.clone(),
                    existing: steps.existing.clone(),
                    comment: steps.comment.clone(),
                }
            })
            .collect();
        Self {
            env: settings.env.clone(),
            actions_file,
            actions,
        }
    }
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["tag", "project", "enabled", "new", "existing", "comment"]);
        for action in &self.actions {
            table.add_row(vec![
                action.whiteboard_tag.clone(),
                action.jira_project_key.clone(),
                if action.enabled { "yes" } else { "no" }.to_string(),
                action.new.join(", "),
                action.existing.join(", "),
                action.comment.join(", "),
            ]);
        }
        format!(
            "Configuration OK ({}, {})\n\n{}",
            self.env,
            self.actions_file.display(),
            render_list("action", &table, self.actions.len())
        )
    }
}

pub fn execute(args: ValidateArgs, settings: &Settings, json_mode: bool) -> Result<()> {
    let actions_file = args.actions.unwrap_or_else(|| settings.actions_file.clone());
    let actions = ConfigLoader::load_actions(&actions_file)
        .with_context(|| format!("Invalid actions file {}", actions_file.display()))?;

    tracing::debug!(count = actions.len(), "Actions loaded");
    output(&ValidateOutput::new(settings, actions_file, &actions), json_mode);
    Ok(())
}
