use revertable::{RevertOutcome, Revertable};
use tracing::info;

use crate::error::ExecError;
use crate::plan::ActionSpec;

/// Logs what an action would do instead of doing it.
#[derive(Debug)]
pub struct DryRunAction {
    name: String,
    apply_description: String,
    revert_description: String,
}

impl DryRunAction {
    #[must_use]
    pub fn new(spec: &ActionSpec) -> Self {
        Self {
            name: spec.name.clone(),
            apply_description: spec.kind.describe_apply(),
            revert_description: spec.kind.describe_revert(),
        }
    }
}

impl Revertable for DryRunAction {
    type Error = ExecError;

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self) -> Result<(), ExecError> {
        info!(action = %self.name, "dry run: would {}", self.apply_description);
        Ok(())
    }

    fn revert(&mut self) -> RevertOutcome<ExecError> {
        info!(action = %self.name, "dry run: would {}", self.revert_description);
        RevertOutcome::Reverted
    }

    fn revert_description(&self) -> String {
        self.revert_description.clone()
    }
}
