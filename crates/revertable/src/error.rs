use std::fmt::{self, Display};

use thiserror::Error;

/// A single failure recorded during a run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError<E> {
    /// The action's apply step failed.
    #[error("could not apply '{action}' (action {index})")]
    Apply {
        /// Position of the action in the list.
        index: usize,
        /// Name of the action.
        action: String,
        /// The error returned by apply.
        #[source]
        source: E,
    },

    /// The action's apply step panicked. The action is treated as having had
    /// no effect and is not reverted.
    #[error("apply of '{action}' (action {index}) panicked: {message}")]
    ApplyPanicked {
        /// Position of the action in the list.
        index: usize,
        /// Name of the action.
        action: String,
        /// The panic payload, if it was a string.
        message: String,
    },

    /// The action's revert step failed; unwinding continued.
    #[error("could not revert '{action}' (action {index})")]
    Revert {
        /// Position of the action in the list.
        index: usize,
        /// Name of the action.
        action: String,
        /// The error returned by revert.
        #[source]
        source: E,
    },

    /// The action's revert step failed and cancelled the rest of the unwind.
    #[error("could not revert '{action}' (action {index}), {skipped} earlier revert(s) cancelled")]
    RevertCancelled {
        /// Position of the action in the list.
        index: usize,
        /// Name of the action.
        action: String,
        /// Number of applied actions whose revert was skipped.
        skipped: usize,
        /// The error returned by revert.
        #[source]
        source: E,
    },

    /// The action's revert step panicked; unwinding continued.
    #[error("revert of '{action}' (action {index}) panicked: {message}")]
    RevertPanicked {
        /// Position of the action in the list.
        index: usize,
        /// Name of the action.
        action: String,
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl<E> ActionError<E> {
    /// Position of the action this error belongs to.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Apply { index, .. }
            | Self::ApplyPanicked { index, .. }
            | Self::Revert { index, .. }
            | Self::RevertCancelled { index, .. }
            | Self::RevertPanicked { index, .. } => *index,
        }
    }

    /// Name of the action this error belongs to.
    #[must_use]
    pub fn action(&self) -> &str {
        match self {
            Self::Apply { action, .. }
            | Self::ApplyPanicked { action, .. }
            | Self::Revert { action, .. }
            | Self::RevertCancelled { action, .. }
            | Self::RevertPanicked { action, .. } => action,
        }
    }

    /// The underlying error, unless the failure was a panic.
    #[must_use]
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::Apply { source, .. }
            | Self::Revert { source, .. }
            | Self::RevertCancelled { source, .. } => Some(source),
            Self::ApplyPanicked { .. } | Self::RevertPanicked { .. } => None,
        }
    }

    #[must_use]
    pub fn is_apply(&self) -> bool {
        matches!(self, Self::Apply { .. } | Self::ApplyPanicked { .. })
    }

    #[must_use]
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::RevertCancelled { .. })
    }
}

/// Every error recorded during a run, in the order they were recorded.
///
/// A `RunError` always holds at least one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError<E> {
    errors: Vec<ActionError<E>>,
}

impl<E> RunError<E> {
    pub(crate) fn from_errors(errors: Vec<ActionError<E>>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[ActionError<E>] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<ActionError<E>> {
        self.errors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionError<E>> {
        self.errors.iter()
    }

    /// The error that stopped the apply phase, if any.
    #[must_use]
    pub fn apply_error(&self) -> Option<&ActionError<E>> {
        self.errors.iter().find(|error| error.is_apply())
    }

    /// Whether a revert cancelled the remainder of the unwind.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.errors.iter().any(ActionError::is_cancel)
    }
}

impl<E: Display> Display for RunError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) during revertable run", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
            if let Some(inner) = error.inner() {
                write!(f, ": {inner}")?;
            }
        }
        Ok(())
    }
}

impl<E> std::error::Error for RunError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|error| error as &(dyn std::error::Error + 'static))
    }
}

impl<E> IntoIterator for RunError<E> {
    type Item = ActionError<E>;
    type IntoIter = std::vec::IntoIter<ActionError<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a RunError<E> {
    type Item = &'a ActionError<E>;
    type IntoIter = std::slice::Iter<'a, ActionError<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
