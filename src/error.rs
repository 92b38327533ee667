use thiserror::Error;

use crate::error_codes::*;
use crate::logging::LogLevel;

pub type PanelResult<T> = std::result::Result<T, PanelError>;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Empty sync job name: please enter a valid name for the job")]
    EmptyName,

    #[error("Existing sync job name {0}: please enter a unique name for the job")]
    DuplicateName(String),

    #[error("No changes to the sync job {0}: job not edited")]
    NoChanges(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{field} folder does not exist: {path}")]
    PathIneligible { field: &'static str, path: String },

    #[error("Syncwatch command failed ({command}): {message}")]
    CommandFailed { command: String, message: String },

    #[error("Unexpected output from {command}: {source}")]
    InvalidResponse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PanelError {
    /// Stable code for the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            PanelError::EmptyName => ERR_EMPTY_JOB_NAME,
            PanelError::DuplicateName(_) => ERR_DUPLICATE_JOB_NAME,
            PanelError::NoChanges(_) => ERR_NO_CHANGES,
            PanelError::InvalidInput(_) => ERR_INVALID_INPUT,
            PanelError::PathIneligible { .. } => ERR_PATH_INELIGIBLE,
            PanelError::CommandFailed { .. } => ERR_COMMAND_FAILED,
            PanelError::InvalidResponse { .. } => ERR_INVALID_RESPONSE,
            PanelError::Config(_) => ERR_CONFIG,
        }
    }

    /// Notification level used when the error is reported to the user.
    pub fn level(&self) -> LogLevel {
        match self {
            PanelError::NoChanges(_) => LogLevel::Info,
            PanelError::EmptyName
            | PanelError::DuplicateName(_)
            | PanelError::InvalidInput(_)
            | PanelError::PathIneligible { .. } => LogLevel::Warning,
            PanelError::CommandFailed { .. }
            | PanelError::InvalidResponse { .. }
            | PanelError::Config(_) => LogLevel::Error,
        }
    }

    /// True for failures of the external command executor.
    pub fn is_executor_failure(&self) -> bool {
        matches!(
            self,
            PanelError::CommandFailed { .. } | PanelError::InvalidResponse { .. }
        )
    }
}

impl From<anyhow::Error> for PanelError {
    fn from(err: anyhow::Error) -> Self {
        PanelError::InvalidInput(err.to_string())
    }
}
