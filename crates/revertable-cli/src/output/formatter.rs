use revertable::{AuditLog, RunError};
use revertable_plan::{ExecError, Plan};

use crate::error::Result;

/// Everything needed to describe a finished run.
pub(crate) struct RunReport<'a> {
    pub(crate) plan: &'a Plan,
    pub(crate) audit_log: &'a AuditLog,
    pub(crate) error: Option<&'a RunError<ExecError>>,
    pub(crate) dry_run: bool,
}

pub(crate) trait ReportFormatter {
    fn format_run(&self, report: &RunReport<'_>) -> Result<String>;
    fn format_plan(&self, plan: &Plan) -> Result<String>;
}

pub(crate) fn status_label(status: revertable::ActionStatus) -> &'static str {
    use revertable::ActionStatus;

    match status {
        ActionStatus::Pending => "pending",
        ActionStatus::Applied => "applied",
        ActionStatus::ApplyFailed => "apply-failed",
        ActionStatus::Reverted => "reverted",
        ActionStatus::RevertFailed => "revert-failed",
        ActionStatus::RevertCancelled => "revert-cancelled",
        ActionStatus::Skipped => "skipped",
        _ => "unknown",
    }
}
