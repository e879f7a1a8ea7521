//! A completion endpoint that answers from a fixed table.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::infrastructure::ports::{CompletionPort, CompletionRequest, LlmError};

/// Replies by matching the player's line against `(needle, reply)` rules.
///
/// The reply is wrapped in the Ollama chat envelope. With a gate, every
/// request waits for a permit first.
pub struct CannedCompletion {
    rules: Vec<(String, String)>,
    default: String,
    gate: Option<Arc<Semaphore>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl CannedCompletion {
    pub fn replying(default: &str) -> Self {
        Self {
            rules: Vec::new(),
            default: default.to_string(),
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn when(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), reply.to_string()));
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// The user turns received so far, e.g. `"Steve says: hi"`.
    pub fn user_turns(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| r.messages.last().map(|m| m.content.clone()))
            .collect()
    }

    fn reply_for(&self, user_turn: &str) -> String {
        self.rules
            .iter()
            .find(|(needle, _)| user_turn.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait]
impl CompletionPort for CannedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
        }
        let user_turn = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let reply = self.reply_for(user_turn);
        Ok(serde_json::json!({
            "model": "qwen3",
            "message": { "role": "assistant", "content": reply },
            "done": true
        })
        .to_string())
    }
}
