use thiserror::Error;

/// Player-scoped, recoverable failures. None of these are fatal to the host
/// process; the command layer renders them as chat messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("selection is outside the editable world bounds")]
    InvalidSelection,
    #[error("no active selection")]
    NoSelection,
    #[error("clipboard is empty")]
    EmptyClipboard,
    #[error("operation failed: {0}")]
    OperationFailed(String),
    #[error("another edit is still in progress")]
    OperationInProgress,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("missing permission {0}")]
    PermissionDenied(String),
}

pub type Result<T> = std::result::Result<T, BuildError>;
