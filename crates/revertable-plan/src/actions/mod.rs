mod command;
mod dry_run;
mod file;

pub use command::{CommandAction, CommandLine};
pub use dry_run::DryRunAction;
pub use file::{CreateDirAction, WriteFileAction};
use revertable::{AuditLog, Revertable, RunError, cancel_on_failure};
use tracing::info;

use crate::config::RunConfig;
use crate::error::ExecError;
use crate::plan::{ActionKind, ActionSpec, Plan};

/// A plan action with its concrete kind erased.
pub type PlanAction = Box<dyn Revertable<Error = ExecError>>;

/// Build the action described by `spec`.
///
/// In dry-run mode every kind becomes a [`DryRunAction`].
#[must_use]
pub fn build_action(spec: &ActionSpec, config: &RunConfig) -> PlanAction {
    let action: PlanAction = if config.dry_run() {
        Box::new(DryRunAction::new(spec))
    } else {
        match &spec.kind {
            ActionKind::Command { apply, revert } => Box::new(CommandAction::new(
                &spec.name,
                CommandLine::Argv(apply.clone()),
                revert.clone().map(CommandLine::Argv),
                config,
            )),
            ActionKind::Shell { apply, revert } => Box::new(CommandAction::new(
                &spec.name,
                CommandLine::Shell(apply.clone()),
                revert.clone().map(CommandLine::Shell),
                config,
            )),
            ActionKind::WriteFile { path, contents } => Box::new(WriteFileAction::new(
                &spec.name,
                config.resolve(path),
                contents.clone(),
            )),
            ActionKind::CreateDir { path } => {
                Box::new(CreateDirAction::new(&spec.name, config.resolve(path)))
            }
        }
    };

    if spec.cancel_unwind_on_revert_failure {
        Box::new(cancel_on_failure(action))
    } else {
        action
    }
}

#[must_use]
pub fn build_actions(plan: &Plan, config: &RunConfig) -> Vec<PlanAction> {
    plan.actions
        .iter()
        .map(|spec| build_action(spec, config))
        .collect()
}

/// Build and run every action of `plan`, returning the run result and its
/// audit log.
pub fn run_plan(plan: &Plan, config: &RunConfig) -> (Result<(), RunError<ExecError>>, AuditLog) {
    info!(
        plan = %plan.name,
        actions = plan.actions.len(),
        dry_run = config.dry_run(),
        working_dir = %config.working_dir().display(),
        "running plan"
    );

    let mut actions = build_actions(plan, config);
    revertable::run_with_audit(&mut actions)
}
