//! Completion endpoint port.

use async_trait::async_trait;
use serde::Serialize;

use super::error::LlmError;

/// A message in the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

/// One request/response exchange with the model endpoint.
///
/// Returns the raw response body. Interpreting the envelope is the caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}
