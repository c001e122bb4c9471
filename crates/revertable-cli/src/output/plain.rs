use revertable_plan::Plan;

use super::{ReportFormatter, RunReport};
use crate::error::Result;

pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    fn format_outcome(output: &mut String, report: &RunReport<'_>) {
        match report.error {
            None if report.dry_run => {
                let count = report.audit_log.records().len();
                output.push_str(&format!(
                    "\nDry run of {count} action(s) finished, nothing was applied\n"
                ));
            }
            None => {
                let count = report.audit_log.records().len();
                output.push_str(&format!("\nAll {count} action(s) applied\n"));
            }
            Some(error) => {
                let reverts = report.audit_log.revert_calls();
                output.push_str(&format!("\nPlan failed, {reverts} revert(s) attempted"));
                if error.was_cancelled() {
                    output.push_str(", unwind cancelled");
                }
                output.push('\n');
            }
        }
    }

    fn format_settings(output: &mut String, plan: &Plan) {
        if let Some(dir) = &plan.settings.working_dir {
            output.push_str(&format!("  working dir: {}\n", dir.display()));
        }
        for key in plan.settings.env.keys() {
            output.push_str(&format!("  env: {key}\n"));
        }
    }
}

impl ReportFormatter for PlainTextFormatter {
    fn format_run(&self, report: &RunReport<'_>) -> Result<String> {
        let mut output = String::new();
        let mode = if report.dry_run { " (dry run)" } else { "" };
        output.push_str(&format!("Plan '{}'{mode}\n", report.plan.name));

        for line in report.audit_log.summary().lines() {
            output.push_str(&format!("  {line}\n"));
        }

        Self::format_outcome(&mut output, report);
        Ok(output)
    }

    fn format_plan(&self, plan: &Plan) -> Result<String> {
        let mut output = String::new();
        output.push_str(&format!(
            "Plan '{}' ({} action(s))\n",
            plan.name,
            plan.actions.len()
        ));
        Self::format_settings(&mut output, plan);

        for (position, action) in plan.actions.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {}: {}\n",
                position + 1,
                action.name,
                action.kind.describe_apply()
            ));
            let cancels = if action.cancel_unwind_on_revert_failure {
                " (cancels unwind on failure)"
            } else {
                ""
            };
            output.push_str(&format!(
                "     revert: {}{cancels}\n",
                action.kind.describe_revert()
            ));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use revertable::{RevertOutcome, Revertable, from_fn, run_with_audit};
    use revertable_plan::ExecError;

    use super::*;

    const PLAN: &str = r#"
name = "rollout"

[settings]
working_dir = "work"
env = { KUBECONFIG = "/tmp/kubeconfig" }

[[actions]]
name = "scale down"
kind = "command"
apply = ["oc", "scale", "--replicas=0"]
revert = ["oc", "scale", "--replicas=1"]
cancel_unwind_on_revert_failure = true

[[actions]]
name = "marker"
kind = "write-file"
path = "marker.txt"
contents = "x"
"#;

    #[test]
    fn plan_listing_shows_order_and_reverts() {
        let plan = Plan::from_toml_str(PLAN).expect("valid plan");

        let output = PlainTextFormatter.format_plan(&plan).expect("format");

        assert!(output.contains("Plan 'rollout' (2 action(s))"));
        assert!(output.contains("working dir: work"));
        assert!(output.contains("env: KUBECONFIG"));
        assert!(output.contains("1. scale down: run `oc scale --replicas=0`"));
        assert!(output.contains("revert: run `oc scale --replicas=1` (cancels unwind on failure)"));
        assert!(output.contains("2. marker: write marker.txt"));
    }

    #[test]
    fn dry_run_does_not_claim_actions_were_applied() {
        let plan = Plan::from_toml_str(PLAN).expect("valid plan");
        let mut actions = vec![from_fn(
            "scale down",
            || Ok::<(), ExecError>(()),
            || RevertOutcome::<ExecError>::Reverted,
        )];
        let (result, audit_log) = run_with_audit(&mut actions);
        let report = RunReport {
            plan: &plan,
            audit_log: &audit_log,
            error: result.as_ref().err(),
            dry_run: true,
        };

        let output = PlainTextFormatter.format_run(&report).expect("format");

        assert!(output.contains("Plan 'rollout' (dry run)"));
        assert!(output.contains("Dry run of 1 action(s) finished, nothing was applied"));
        assert!(!output.contains("All 1 action(s) applied"));
    }

    #[test]
    fn failed_run_reports_reverts_and_cancel() {
        let plan = Plan::from_toml_str(PLAN).expect("valid plan");
        let mut actions: Vec<Box<dyn Revertable<Error = ExecError>>> = vec![
            Box::new(from_fn(
                "scale down",
                || Ok::<(), ExecError>(()),
                || RevertOutcome::<ExecError>::Cancelled(ExecError::EmptyCommand),
            )),
            Box::new(from_fn(
                "marker",
                || Err::<(), ExecError>(ExecError::EmptyCommand),
                || RevertOutcome::<ExecError>::Reverted,
            )),
        ];
        let (result, audit_log) = run_with_audit(&mut actions);
        let report = RunReport {
            plan: &plan,
            audit_log: &audit_log,
            error: result.as_ref().err(),
            dry_run: false,
        };

        let output = PlainTextFormatter.format_run(&report).expect("format");

        assert!(output.contains("Plan 'rollout'\n"));
        assert!(output.contains("  ⊘ scale down"));
        assert!(output.contains("  ✗ marker"));
        assert!(output.contains("Plan failed, 2 revert(s) attempted, unwind cancelled"));
    }
}
