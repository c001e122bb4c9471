use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::action::Revertable;
use crate::audit::{ActionStatus, AuditLog};
use crate::error::{ActionError, RunError};
use crate::outcome::RevertOutcome;

/// Apply every action in order, unwinding on the first failure.
///
/// On failure the failing action is reverted once, then every previously
/// applied action is reverted in reverse order. A failed revert is recorded
/// and the unwind continues; a cancelled revert is recorded and no earlier
/// action is reverted.
///
/// # Errors
///
/// Returns a [`RunError`] holding every apply and revert error, in the order
/// they occurred.
pub fn run<R: Revertable>(actions: &mut [R]) -> Result<(), RunError<R::Error>> {
    let (result, _audit_log) = run_with_audit(actions);
    result
}

/// Like [`run`], additionally returning an audit log of the run.
pub fn run_with_audit<R: Revertable>(
    actions: &mut [R],
) -> (Result<(), RunError<R::Error>>, AuditLog) {
    let mut audit_log = AuditLog::new();
    for action in actions.iter() {
        audit_log.record_pending(action.name(), action.revert_description());
    }

    let mut errors = Vec::new();
    let revert_count = apply_all(actions, &mut errors, &mut audit_log);

    for (index, action) in actions[..revert_count].iter_mut().enumerate().rev() {
        if revert_action(index, action, &mut errors, &mut audit_log) {
            for earlier in 0..index {
                audit_log.record_skipped(earlier);
            }
            break;
        }
    }

    match RunError::from_errors(errors) {
        Some(run_error) => (Err(run_error), audit_log),
        None => {
            debug!(count = actions.len(), "all actions applied");
            (Ok(()), audit_log)
        }
    }
}

/// Returns how many actions, counted from the front, need reverting.
fn apply_all<R: Revertable>(
    actions: &mut [R],
    errors: &mut Vec<ActionError<R::Error>>,
    audit_log: &mut AuditLog,
) -> usize {
    for (index, action) in actions.iter_mut().enumerate() {
        let name = action.name().to_string();
        debug!(index, action = %name, "applying action");
        audit_log.record_start(index);

        match panic::catch_unwind(AssertUnwindSafe(|| action.apply())) {
            Ok(Ok(())) => audit_log.record_applied(index),
            Ok(Err(source)) => {
                warn!(index, action = %name, "apply failed, reverting");
                audit_log.record_apply_failed(index);
                errors.push(ActionError::Apply {
                    index,
                    action: name,
                    source,
                });
                // the failing action may have partial effects of its own
                return index + 1;
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                warn!(index, action = %name, %message, "apply panicked, reverting");
                audit_log.record_apply_failed(index);
                errors.push(ActionError::ApplyPanicked {
                    index,
                    action: name,
                    message,
                });
                return index;
            }
        }
    }

    0
}

/// Revert one action, returning `true` if it cancelled the unwind.
fn revert_action<R: Revertable>(
    index: usize,
    action: &mut R,
    errors: &mut Vec<ActionError<R::Error>>,
    audit_log: &mut AuditLog,
) -> bool {
    let name = action.name().to_string();
    debug!(index, action = %name, "reverting action");

    match panic::catch_unwind(AssertUnwindSafe(|| action.revert())) {
        Ok(RevertOutcome::Reverted) => {
            audit_log.record_revert(index, ActionStatus::Reverted);
            false
        }
        Ok(RevertOutcome::Failed(source)) => {
            warn!(index, action = %name, "revert failed, continuing");
            audit_log.record_revert(index, ActionStatus::RevertFailed);
            errors.push(ActionError::Revert {
                index,
                action: name,
                source,
            });
            false
        }
        Ok(RevertOutcome::Cancelled(source)) => {
            warn!(
                index,
                action = %name,
                skipped = index,
                "revert cancelled, skipping remaining reverts"
            );
            audit_log.record_revert(index, ActionStatus::RevertCancelled);
            errors.push(ActionError::RevertCancelled {
                index,
                action: name,
                skipped: index,
                source,
            });
            true
        }
        Err(payload) => {
            let message = panic_message(&*payload);
            warn!(index, action = %name, %message, "revert panicked, continuing");
            audit_log.record_revert(index, ActionStatus::RevertFailed);
            errors.push(ActionError::RevertPanicked {
                index,
                action: name,
                message,
            });
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
