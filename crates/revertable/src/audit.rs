use std::time::Instant;

/// Status of an action in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionStatus {
    /// Apply was never reached.
    Pending,
    /// Apply succeeded and no revert was needed.
    Applied,
    /// Apply failed (or panicked).
    ApplyFailed,
    /// Revert succeeded.
    Reverted,
    /// Revert failed.
    RevertFailed,
    /// Revert failed and cancelled the remainder of the unwind.
    RevertCancelled,
    /// Apply succeeded but revert was skipped after a cancel.
    Skipped,
}

/// Record of one action's lifecycle within a run.
#[derive(Debug)]
pub struct ActionRecord {
    /// Position of the action in the list.
    pub index: usize,
    /// Name of the action.
    pub name: String,
    /// Current status.
    pub status: ActionStatus,
    /// Description of what revert does.
    pub revert_description: String,
    /// Number of times revert was called.
    pub revert_calls: usize,
    /// When apply started.
    pub started_at: Option<Instant>,
    /// When the last apply or revert finished.
    pub completed_at: Option<Instant>,
}

/// Audit log tracking every action of a run.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Vec<ActionRecord>,
}

impl AuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action in `Pending` state.
    pub(crate) fn record_pending(&mut self, name: &str, revert_description: String) {
        let index = self.records.len();
        self.records.push(ActionRecord {
            index,
            name: name.to_string(),
            status: ActionStatus::Pending,
            revert_description,
            revert_calls: 0,
            started_at: None,
            completed_at: None,
        });
    }

    pub(crate) fn record_start(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.started_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_applied(&mut self, index: usize) {
        self.set_status(index, ActionStatus::Applied);
    }

    pub(crate) fn record_apply_failed(&mut self, index: usize) {
        self.set_status(index, ActionStatus::ApplyFailed);
    }

    /// Record a revert attempt and its result.
    ///
    /// A successful revert of an action whose apply failed keeps the
    /// `ApplyFailed` status, since that is the more informative of the two.
    pub(crate) fn record_revert(&mut self, index: usize, status: ActionStatus) {
        if let Some(record) = self.records.get_mut(index) {
            record.revert_calls += 1;
            record.completed_at = Some(Instant::now());
            if !(status == ActionStatus::Reverted && record.status == ActionStatus::ApplyFailed) {
                record.status = status;
            }
        }
    }

    pub(crate) fn record_skipped(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.status = ActionStatus::Skipped;
        }
    }

    fn set_status(&mut self, index: usize, status: ActionStatus) {
        if let Some(record) = self.records.get_mut(index) {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Get all records in the audit log, in action order.
    #[must_use]
    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    /// Total number of revert calls made during the run.
    #[must_use]
    pub fn revert_calls(&self) -> usize {
        self.records.iter().map(|record| record.revert_calls).sum()
    }

    /// Get a summary of the run for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                ActionStatus::Pending => "·",
                ActionStatus::Applied => "✓",
                ActionStatus::ApplyFailed => "✗",
                ActionStatus::Reverted => "↩",
                ActionStatus::RevertFailed => "⚠",
                ActionStatus::RevertCancelled => "⊘",
                ActionStatus::Skipped => "-",
            };
            lines.push(format!("{status} {}", record.name));
        }
        lines.join("\n")
    }
}
