use std::fmt;

use crate::outcome::RevertOutcome;

/// A unit of work that can be applied and later undone.
///
/// `revert` is only called after `apply` has run on the same instance: either
/// because `apply` succeeded and a later action failed, or because `apply`
/// itself failed and may have left partial effects behind.
pub trait Revertable {
    /// Error type for apply and revert failures.
    type Error;

    /// Human-readable name for logging and error messages.
    fn name(&self) -> &str {
        "action"
    }

    /// Perform the forward step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step could not be completed.
    fn apply(&mut self) -> Result<(), Self::Error>;

    /// Undo the effects of `apply`.
    ///
    /// The default implementation is a no-op, suitable for read-only actions.
    fn revert(&mut self) -> RevertOutcome<Self::Error> {
        RevertOutcome::Reverted
    }

    /// Human-readable description of what `revert` will do.
    fn revert_description(&self) -> String {
        format!("undo {}", self.name())
    }
}

impl<R: Revertable + ?Sized> Revertable for Box<R> {
    type Error = R::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&mut self) -> Result<(), Self::Error> {
        (**self).apply()
    }

    fn revert(&mut self) -> RevertOutcome<Self::Error> {
        (**self).revert()
    }

    fn revert_description(&self) -> String {
        (**self).revert_description()
    }
}

impl<R: Revertable + ?Sized> Revertable for &mut R {
    type Error = R::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&mut self) -> Result<(), Self::Error> {
        (**self).apply()
    }

    fn revert(&mut self) -> RevertOutcome<Self::Error> {
        (**self).revert()
    }

    fn revert_description(&self) -> String {
        (**self).revert_description()
    }
}

/// An action backed by a pair of closures.
pub struct FnAction<A, R> {
    name: String,
    apply: A,
    revert: R,
}

/// Build an action from an apply closure and a revert closure.
///
/// The revert closure may return either a `Result<(), E>` (failures do not
/// halt the unwind) or a [`RevertOutcome`] when it needs to cancel.
pub fn from_fn<A, R, O, E>(name: impl Into<String>, apply: A, revert: R) -> FnAction<A, R>
where
    A: FnMut() -> Result<(), E>,
    R: FnMut() -> O,
    O: Into<RevertOutcome<E>>,
{
    FnAction {
        name: name.into(),
        apply,
        revert,
    }
}

impl<A, R, O, E> Revertable for FnAction<A, R>
where
    A: FnMut() -> Result<(), E>,
    R: FnMut() -> O,
    O: Into<RevertOutcome<E>>,
{
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self) -> Result<(), E> {
        (self.apply)()
    }

    fn revert(&mut self) -> RevertOutcome<E> {
        (self.revert)().into()
    }
}

impl<A, R> fmt::Debug for FnAction<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Wraps an action so that any failed revert cancels the rest of the unwind.
#[derive(Debug)]
pub struct CancelOnFailure<R> {
    inner: R,
}

/// Escalate every revert failure of `action` into a cancel.
pub fn cancel_on_failure<R: Revertable>(action: R) -> CancelOnFailure<R> {
    CancelOnFailure { inner: action }
}

impl<R: Revertable> Revertable for CancelOnFailure<R> {
    type Error = R::Error;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn apply(&mut self) -> Result<(), Self::Error> {
        self.inner.apply()
    }

    fn revert(&mut self) -> RevertOutcome<Self::Error> {
        match self.inner.revert() {
            RevertOutcome::Failed(error) => RevertOutcome::Cancelled(error),
            outcome => outcome,
        }
    }

    fn revert_description(&self) -> String {
        self.inner.revert_description()
    }
}
