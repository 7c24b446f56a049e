//! Setup trigger status values.
//!
//! The trigger record's `setup-status` key moves monotonically along
//! `requested -> in-progress -> {completed, failed}` with a mirror chain for
//! undo. Unknown strings parse to `None` and are treated like an unset
//! status.

/// Status of the setup trigger's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStatus {
    /// Setup asked for, not yet picked up
    Requested,
    /// Setup pipeline running
    InProgress,
    /// Setup pipeline finished successfully
    Completed,
    /// Setup pipeline aborted on a step failure
    Failed,
    /// Undo asked for, not yet picked up
    UndoRequested,
    /// Undo pipeline running
    UndoInProgress,
    /// Undo pipeline ran to the end
    UndoCompleted,
    /// Undo refused (or the pipeline could not be started)
    UndoFailed,
}

impl SetupStatus {
    /// Wire form written into the trigger record
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::UndoRequested => "undo-requested",
            Self::UndoInProgress => "undo-in-progress",
            Self::UndoCompleted => "undo-completed",
            Self::UndoFailed => "undo-failed",
        }
    }

    /// Parse the wire form; unknown strings are `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "requested" => Some(Self::Requested),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "undo-requested" => Some(Self::UndoRequested),
            "undo-in-progress" => Some(Self::UndoInProgress),
            "undo-completed" => Some(Self::UndoCompleted),
            "undo-failed" => Some(Self::UndoFailed),
            _ => None,
        }
    }
}
