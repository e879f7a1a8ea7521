//! Domain error type

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., blank companion name)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects and script data)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// A rule violation, e.g. a blank companion name.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
