//! Integration tests for the run audit log.

use revertable::{ActionStatus, RevertOutcome, Revertable, run_with_audit};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(&'static str);

struct Step {
    name: &'static str,
    apply: Result<(), &'static str>,
    revert: RevertOutcome<&'static str>,
}

impl Step {
    fn ok(name: &'static str) -> Self {
        Self {
            name,
            apply: Ok(()),
            revert: RevertOutcome::Reverted,
        }
    }

    fn failing_apply(mut self) -> Self {
        self.apply = Err("apply failed");
        self
    }

    fn failing_revert(mut self) -> Self {
        self.revert = RevertOutcome::Failed("revert failed");
        self
    }

    fn cancelling_revert(mut self) -> Self {
        self.revert = RevertOutcome::Cancelled("revert cancelled");
        self
    }
}

impl Revertable for Step {
    type Error = TestError;

    fn name(&self) -> &str {
        self.name
    }

    fn apply(&mut self) -> Result<(), TestError> {
        self.apply.map_err(TestError)
    }

    fn revert(&mut self) -> RevertOutcome<TestError> {
        match &self.revert {
            RevertOutcome::Reverted => RevertOutcome::Reverted,
            RevertOutcome::Failed(msg) => RevertOutcome::Failed(TestError(msg)),
            RevertOutcome::Cancelled(msg) => RevertOutcome::Cancelled(TestError(msg)),
        }
    }

    fn revert_description(&self) -> String {
        format!("delete {}", self.name)
    }
}

fn statuses(records: &[revertable::ActionRecord]) -> Vec<ActionStatus> {
    records.iter().map(|record| record.status).collect()
}

#[test]
fn successful_run_marks_every_action_applied() {
    let mut actions = vec![Step::ok("namespace"), Step::ok("configmap")];

    let (result, audit_log) = run_with_audit(&mut actions);

    assert!(result.is_ok());
    assert_eq!(
        statuses(audit_log.records()),
        vec![ActionStatus::Applied, ActionStatus::Applied]
    );
    assert_eq!(audit_log.revert_calls(), 0);
    assert_eq!(audit_log.records()[1].revert_description, "delete configmap");
}

#[test]
fn failed_run_tracks_reverts_and_untouched_actions() {
    let mut actions = vec![
        Step::ok("namespace"),
        Step::ok("configmap").failing_revert(),
        Step::ok("deployment").failing_apply(),
        Step::ok("service"),
    ];

    let (result, audit_log) = run_with_audit(&mut actions);

    assert!(result.is_err());
    assert_eq!(
        statuses(audit_log.records()),
        vec![
            ActionStatus::Reverted,
            ActionStatus::RevertFailed,
            ActionStatus::ApplyFailed,
            ActionStatus::Pending,
        ]
    );
    assert_eq!(audit_log.revert_calls(), 3);
    assert!(audit_log.records()[3].started_at.is_none());
}

#[test]
fn cancelled_run_marks_earlier_actions_skipped() {
    let mut actions = vec![
        Step::ok("first"),
        Step::ok("second"),
        Step::ok("third").cancelling_revert(),
        Step::ok("fourth").failing_apply(),
    ];

    let (result, audit_log) = run_with_audit(&mut actions);

    assert!(result.is_err());
    assert_eq!(
        statuses(audit_log.records()),
        vec![
            ActionStatus::Skipped,
            ActionStatus::Skipped,
            ActionStatus::RevertCancelled,
            ActionStatus::ApplyFailed,
        ]
    );
    assert_eq!(audit_log.records()[0].revert_calls, 0);
    assert_eq!(audit_log.records()[1].revert_calls, 0);
}

#[test]
fn summary_lists_actions_in_order() {
    let mut actions = vec![Step::ok("first"), Step::ok("second").failing_apply()];

    let (_result, audit_log) = run_with_audit(&mut actions);

    assert_eq!(audit_log.summary(), "↩ first\n✗ second");
}
