//! Implementation of the `jbi steps` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::action::{
    DEFAULT_COMMENT_STEPS, DEFAULT_EXISTING_STEPS, DEFAULT_NEW_STEPS,
};
use crate::domain::models::step::Step;

#[derive(Args, Debug)]
pub struct StepsArgs {}

#[derive(Debug, Serialize)]
pub struct StepSummary {
    pub name: &'static str,
    pub collaborators: Vec<&'static str>,
    /// Groups that run this step when an action leaves `steps` out.
    pub default_in: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct StepsOutput {
    pub steps: Vec<StepSummary>,
}

impl StepsOutput {
    pub fn catalogue() -> Self {
        let defaults = [
            ("new", DEFAULT_NEW_STEPS),
            ("existing", DEFAULT_EXISTING_STEPS),
            ("comment", DEFAULT_COMMENT_STEPS),
        ];
        let steps = Step::ALL
            .iter()
            .map(|step| StepSummary {
                name: step.name(),
                collaborators: step.requirements().names(),
                default_in: defaults
                    .iter()
                    .filter(|(_, names)| names.contains(&step.name()))
                    .map(|(group, _)| *group)
                    .collect(),
            })
            .collect();
        Self { steps }
    }
}

impl CommandOutput for StepsOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["step", "uses", "default in"]);
        for step in &self.steps {
            table.add_row(vec![
                step.name.to_string(),
                step.collaborators.join(", "),
                step.default_in.join(", "),
            ]);
        }
        render_list("step", &table, self.steps.len())
    }
}

pub fn execute(_args: StepsArgs, json_mode: bool) -> Result<()> {
    output(&StepsOutput::catalogue(), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_lists_every_step() {
        let catalogue = StepsOutput::catalogue();
        assert_eq!(catalogue.steps.len(), Step::ALL.len());

        let create = &catalogue.steps[0];
        assert_eq!(create.name, "create_issue");
        assert_eq!(create.collaborators, vec!["parameters", "jira"]);
        assert_eq!(create.default_in, vec!["new"]);
    }
}
