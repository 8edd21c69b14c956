//! Contract error types for script service
//!
//! These errors are transport-agnostic and used for inter-module communication.

use super::model::FailedOperation;

/// Script service domain errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Script or element not found
    NotFound {
        /// Resource type (script, element)
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// Malformed request or batch
    Validation {
        /// Validation error message
        message: String,
    },
    /// One or more operations failed; nothing was persisted
    BatchRejected {
        /// Every failed operation with its message
        failed: Vec<FailedOperation>,
        /// Number of operations attempted
        attempted: usize,
    },
    /// The final transaction failed and was rolled back
    CommitFailed {
        /// Failure reason
        reason: String,
    },
    /// Internal error
    Internal,
}

impl ScriptError {
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { resource, id } => {
                write!(f, "{} not found: {}", resource, id)
            }
            Self::Validation { message } => {
                write!(f, "Validation error: {}", message)
            }
            Self::BatchRejected { failed, attempted } => {
                write!(
                    f,
                    "Batch rejected: {} of {} operations failed",
                    failed.len(),
                    attempted
                )?;
                for op in failed {
                    write!(f, "; {}: {}", op.operation_id, op.error)?;
                }
                Ok(())
            }
            Self::CommitFailed { reason } => {
                write!(f, "Commit failed: {}", reason)
            }
            Self::Internal => {
                write!(f, "Internal error")
            }
        }
    }
}

impl std::error::Error for ScriptError {}
