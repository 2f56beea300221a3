//! Property tests for step group resolution, response bookkeeping and
//! operation classification.

use std::collections::BTreeMap;

use jbi::domain::models::jira::{JiraContext, JiraIssue};
use jbi::domain::models::{
    Action, ActionContext, ActionParams, ActionSteps, Bug, EventTarget, StepsByOperation,
    WebhookEvent,
};
use jbi::services::runner::{classify, LinkedIssue};
use jbi::{ConfigError, Operation, Step};
use proptest::prelude::*;
use serde_json::json;

const GROUPS: [&str; 3] = ["new", "existing", "comment"];

fn step_strategy() -> impl Strategy<Value = Step> {
    prop::sample::select(Step::ALL.to_vec())
}

fn target_strategy() -> impl Strategy<Value = EventTarget> {
    prop_oneof![
        Just(EventTarget::Bug),
        Just(EventTarget::Comment),
        "[a-z]{1,10}".prop_map(EventTarget::from),
    ]
}

fn linked_strategy() -> impl Strategy<Value = LinkedIssue> {
    prop_oneof![
        Just(LinkedIssue::None),
        "[A-Z]{2,5}-[0-9]{1,4}".prop_map(LinkedIssue::Unreadable),
        prop::sample::select(vec!["JBI", "FOO", "DevTest"]).prop_map(|project| {
            LinkedIssue::Found(JiraIssue {
                key: format!("{project}-1"),
                project_key: project.to_string(),
                summary: None,
                status: None,
            })
        }),
    ]
}

proptest! {
    /// Property: only `new`, `existing` and `comment` are accepted as groups.
    #[test]
    fn prop_unknown_group_is_rejected(group in "[a-z_]{1,12}") {
        prop_assume!(!GROUPS.contains(&group.as_str()));

        let map = BTreeMap::from([(group.clone(), vec!["create_issue".to_string()])]);
        let result = ActionSteps::try_from(map);
        prop_assert!(
            matches!(result, Err(ConfigError::UnsupportedStepGroup(ref g)) if *g == group),
            "group {group:?} should be rejected"
        );
    }

    /// Property: any sequence of known steps resolves to the same steps, in order.
    #[test]
    fn prop_known_steps_resolve_in_order(
        group_index in 0usize..3,
        steps in prop::collection::vec(step_strategy(), 0..8)
    ) {
        let group = GROUPS[group_index];
        let names: Vec<String> = steps.iter().map(|s| s.name().to_string()).collect();
        let resolved = StepsByOperation::from_groups([(group, names.as_slice())]).unwrap();

        let operation = match group {
            "new" => Operation::Create,
            "existing" => Operation::Update,
            _ => Operation::Comment,
        };
        prop_assert_eq!(resolved.steps_for(operation), steps.as_slice());
    }

    /// Property: responses are keyed by exactly the steps that produced some.
    #[test]
    fn prop_responses_keyed_by_producing_steps(
        runs in prop::collection::vec((step_strategy(), 0usize..3), 0..10)
    ) {
        let mut ctx = ActionContext::new(
            Action::new("devtest", ActionParams::new("JBI")),
            "rid",
            Bug::new(1),
            WebhookEvent::new("create", "bug"),
            Operation::Create,
            JiraContext::new("JBI", None),
        );
        let mut expected: Vec<&str> = Vec::new();
        let mut total = 0;
        for (step, count) in &runs {
            ctx = ctx
                .with_current_step(step.name())
                .with_responses((0..*count).map(|i| json!({ "n": i })));
            if *count > 0 && !expected.contains(&step.name()) {
                expected.push(step.name());
            }
            total += count;
        }

        let keys: Vec<&str> = ctx.responses_by_step().steps().collect();
        prop_assert_eq!(keys, expected);
        prop_assert_eq!(ctx.responses_by_step().flatten().len(), total);
    }

    /// Property: classification has no hidden state.
    #[test]
    fn prop_classification_is_idempotent(
        target in target_strategy(),
        linked in linked_strategy(),
        project in prop::sample::select(vec!["JBI", "FOO"])
    ) {
        let first = classify(&target, &linked, project).map_err(|e| e.to_string());
        let second = classify(&target, &linked, project).map_err(|e| e.to_string());
        prop_assert_eq!(&first, &second);
        prop_assert_ne!(first, Ok(Operation::Ignore));
    }
}
