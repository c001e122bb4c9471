use revertable_plan::Plan;
use serde::Serialize;

use super::{ReportFormatter, RunReport, status_label};
use crate::error::Result;

pub(crate) struct JsonFormatter;

#[derive(Serialize)]
struct JsonRun<'a> {
    plan: &'a str,
    dry_run: bool,
    success: bool,
    cancelled: bool,
    actions: Vec<JsonAction<'a>>,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct JsonAction<'a> {
    index: usize,
    name: &'a str,
    status: &'static str,
    revert_calls: usize,
    revert_description: &'a str,
}

impl ReportFormatter for JsonFormatter {
    fn format_run(&self, report: &RunReport<'_>) -> Result<String> {
        let actions = report
            .audit_log
            .records()
            .iter()
            .map(|record| JsonAction {
                index: record.index,
                name: &record.name,
                status: status_label(record.status),
                revert_calls: record.revert_calls,
                revert_description: &record.revert_description,
            })
            .collect();

        let errors = report
            .error
            .map(|error| {
                error
                    .iter()
                    .map(|action_error| match action_error.inner() {
                        Some(inner) => format!("{action_error}: {inner}"),
                        None => action_error.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let run = JsonRun {
            plan: &report.plan.name,
            dry_run: report.dry_run,
            success: report.error.is_none(),
            cancelled: report.error.is_some_and(|error| error.was_cancelled()),
            actions,
            errors,
        };

        let mut rendered = serde_json::to_string_pretty(&run)?;
        rendered.push('\n');
        Ok(rendered)
    }

    fn format_plan(&self, plan: &Plan) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(plan)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use revertable::{RevertOutcome, Revertable, from_fn, run_with_audit};
    use revertable_plan::ExecError;

    use super::*;

    fn plan() -> Plan {
        Plan::from_yaml_str(
            r"
name: json
actions:
  - name: first
    kind: shell
    apply: 'true'
  - name: second
    kind: command
    apply: [oc, apply]
    revert: [oc, delete]
",
        )
        .expect("valid plan")
    }

    #[test]
    fn run_report_lists_statuses_and_errors() -> anyhow::Result<()> {
        let plan = plan();
        let mut actions: Vec<Box<dyn Revertable<Error = ExecError>>> = vec![
            Box::new(from_fn(
                "first",
                || Ok::<(), ExecError>(()),
                || RevertOutcome::<ExecError>::Reverted,
            )),
            Box::new(from_fn(
                "second",
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

        let rendered = JsonFormatter.format_run(&report)?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;

        assert_eq!(value["plan"], "json");
        assert_eq!(value["success"], false);
        assert_eq!(value["cancelled"], false);
        assert_eq!(value["actions"][0]["status"], "reverted");
        assert_eq!(value["actions"][1]["status"], "apply-failed");
        assert_eq!(value["actions"][1]["revert_calls"], 1);
        assert_eq!(
            value["errors"][0],
            "could not apply 'second' (action 1): empty command"
        );
        Ok(())
    }

    #[test]
    fn plan_serializes_with_kind_tags() -> anyhow::Result<()> {
        let rendered = JsonFormatter.format_plan(&plan())?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;

        assert_eq!(value["actions"][0]["kind"], "shell");
        assert_eq!(value["actions"][1]["kind"], "command");
        assert_eq!(value["actions"][1]["revert"][0], "oc");
        Ok(())
    }
}
