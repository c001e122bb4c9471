//! Apply/revert action sequencing.
//!
//! An ordered list of [`Revertable`] actions is applied front to back. When an
//! apply fails, the failing action is reverted to clean up any partial effect,
//! then every previously applied action is reverted in reverse order. Revert
//! failures do not stop the unwind; a [`RevertOutcome::Cancelled`] revert does.
//! Every failure is collected into a single [`RunError`].

mod action;
mod audit;
mod error;
mod outcome;
mod sequencer;

pub use action::{CancelOnFailure, FnAction, Revertable, cancel_on_failure, from_fn};
pub use audit::{ActionRecord, ActionStatus, AuditLog};
pub use error::{ActionError, RunError};
pub use outcome::RevertOutcome;
pub use sequencer::{run, run_with_audit};
