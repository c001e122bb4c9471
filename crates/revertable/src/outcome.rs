/// Result of reverting a single action.
///
/// `Cancelled` carries an error like `Failed`, but additionally tells the
/// sequencer to stop reverting the actions that were applied before this one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RevertOutcome<E> {
    /// The action's effects were undone.
    Reverted,
    /// The revert failed; unwinding continues with the previous action.
    Failed(E),
    /// The revert failed and no earlier action may be reverted.
    Cancelled(E),
}

impl<E> RevertOutcome<E> {
    /// Map a revert result to an outcome that halts the unwind on failure.
    pub fn cancel_on_err(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Reverted,
            Err(error) => Self::Cancelled(error),
        }
    }

    #[must_use]
    pub fn is_reverted(&self) -> bool {
        matches!(self, Self::Reverted)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Take the error out of a `Failed` or `Cancelled` outcome.
    #[must_use]
    pub fn into_error(self) -> Option<E> {
        match self {
            Self::Reverted => None,
            Self::Failed(error) | Self::Cancelled(error) => Some(error),
        }
    }
}

impl<E> From<Result<(), E>> for RevertOutcome<E> {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Reverted,
            Err(error) => Self::Failed(error),
        }
    }
}
