//! Executes the steps of one action, in order, against a context.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{ConfigError, RunnerError, StepError};
use crate::domain::models::action::{Action, ActionParams};
use crate::domain::models::context::{ActionContext, ActionResult};
use crate::domain::models::step::StepsByOperation;
use crate::domain::ports::{BugzillaService, JiraService, MetricsSink};
use crate::services::metrics;
use crate::services::steps::{run_step, StepCollaborators};

/// Runs the steps configured for an action.
///
/// Built per action; the step groups are resolved once here so that an
/// unknown step name fails at construction, not mid-request.
pub struct Executor {
    parameters: ActionParams,
    whiteboard_tag: String,
    steps: StepsByOperation,
    bugzilla: Arc<dyn BugzillaService>,
    jira: Arc<dyn JiraService>,
    metrics: Arc<dyn MetricsSink>,
}

impl Executor {
    pub fn new(
        action: &Action,
        bugzilla: Arc<dyn BugzillaService>,
        jira: Arc<dyn JiraService>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self, ConfigError> {
        let steps = StepsByOperation::try_from(&action.parameters.steps)?;
        Ok(Self {
            parameters: action.parameters.clone(),
            whiteboard_tag: action.whiteboard_tag.clone(),
            steps,
            bugzilla,
            jira,
            metrics,
        })
    }

    pub const fn steps(&self) -> &StepsByOperation {
        &self.steps
    }

    /// Run every step of the context's operation group.
    ///
    /// Reaching the end of the group is success, even when some steps were
    /// incomplete. Any other step error aborts the run.
    #[instrument(skip_all, fields(tag = %self.whiteboard_tag, operation = %context.operation()))]
    pub async fn run(&self, context: ActionContext) -> Result<(bool, ActionResult), RunnerError> {
        let mut context = context;
        let mut has_produced_request = false;
        let operation = context.operation();

        for &step in self.steps.steps_for(operation) {
            context = context.with_current_step(step.name());
            let deps = StepCollaborators::resolve(
                step,
                &self.parameters,
                self.bugzilla.as_ref(),
                self.jira.as_ref(),
            );

            context = match run_step(step, context, &deps).await {
                Ok(updated) => updated,
                Err(StepError::Incomplete { context: partial, reason }) => {
                    warn!(
                        rid = %partial.rid(),
                        step = step.name(),
                        reason = %reason,
                        "Step incomplete, continuing with the next step"
                    );
                    self.metrics.incr(&metrics::incomplete(&self.whiteboard_tag));
                    *partial
                }
                Err(err) => {
                    if has_produced_request {
                        self.metrics.incr(&metrics::aborted(&self.whiteboard_tag));
                    }
                    return Err(RunnerError::Step {
                        step: step.name().to_string(),
                        source: err,
                    });
                }
            };
            debug_assert_eq!(context.operation(), operation, "step {step} changed the operation");

            let responses = context.responses_by_step().get(step.name());
            if !responses.is_empty() {
                has_produced_request = true;
                for response in responses {
                    debug!(
                        step = step.name(),
                        response = %response,
                        context = %context.log_json(),
                        "Received response"
                    );
                }
            }
        }

        info!(rid = %context.rid(), "Steps completed");
        Ok((
            true,
            ActionResult {
                responses: context.responses_by_step().flatten(),
            },
        ))
    }
}
