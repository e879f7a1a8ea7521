//! Error types for port operations.

/// Save record errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a Storage error with operation context.
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request timed out")]
    Timeout,
    #[error("LLM endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
}
