//! Error handling for the VA pipeline
//!
//! Every error carries a stable code and, where it helps, recovery
//! suggestions the CLI prints alongside the blocking error message.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, VaError>;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum VaError {
    // Discovery Errors
    #[error("Folder '{folder}' not found under {}", root.display())]
    NotFound { folder: String, root: PathBuf },

    // Host Errors
    #[error("Host operation '{operation}' failed: {reason}")]
    HostOperation { operation: String, reason: String },

    #[error("Invalid audio file {}: {reason}", path.display())]
    InvalidAudio {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Incompatible media for glue: {reason}")]
    IncompatibleMedia { reason: String },

    // Session Errors
    #[error("Session not found: {}", path.display())]
    SessionNotFound { path: PathBuf },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VaError {
    /// Shorthand for a failed host primitive
    pub fn host(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        VaError::HostOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            VaError::NotFound { .. } => "NOT_FOUND",
            VaError::HostOperation { .. } => "HOST_OPERATION_FAILURE",
            VaError::InvalidAudio { .. } => "INVALID_AUDIO",
            VaError::IncompatibleMedia { .. } => "INCOMPATIBLE_MEDIA",
            VaError::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            VaError::NothingToUndo => "NOTHING_TO_UNDO",
            VaError::NothingToRedo => "NOTHING_TO_REDO",
            VaError::InvalidConfig { .. } => "INVALID_CONFIG",
            VaError::Io(_) => "IO_ERROR",
            VaError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether this error came out of a host primitive.
    ///
    /// These all abort the rest of the running stage; earlier stages keep
    /// their undo transactions.
    pub fn is_host_failure(&self) -> bool {
        matches!(
            self,
            VaError::HostOperation { .. }
                | VaError::InvalidAudio { .. }
                | VaError::IncompatibleMedia { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            VaError::NotFound { .. } => vec![
                "Create the voice-line folder next to the project",
                "Put one subfolder per character inside it",
                "Use --va-folder if the folder has a different name",
            ],
            VaError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "Re-export the recording as PCM or float WAV",
            ],
            VaError::IncompatibleMedia { .. } => vec![
                "Convert all recordings to the same sample rate and channel count",
            ],
            VaError::NothingToUndo => vec!["There are no actions to undo"],
            VaError::NothingToRedo => vec!["There are no undone actions to redo"],
            VaError::SessionNotFound { .. } => {
                vec!["Run 'va-pipeline run <project>' to create a session"]
            }
            _ => vec![],
        }
    }
}
