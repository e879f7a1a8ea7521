//! One model exchange per player line.

use std::sync::Arc;
use std::time::Duration;

use minefriend_domain::Phase;

use crate::infrastructure::ports::{CompletionPort, RandomPort};
use crate::infrastructure::random::pick;

use super::prompt::{build_request, FALLBACK_PERSONAS};
use super::reply::{extract_message, parse_directive, sanitize_input, strip_reasoning};

/// Said when the endpoint could not be reached in time.
pub const FALLBACK_REPLY: &str = "Sorry, I lost my train of thought.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub persona: String,
    /// Display text. Empty means there is nothing to say.
    pub text: String,
    pub suggested_phase: Option<Phase>,
    /// Synthesized locally after a transport failure.
    pub fallback: bool,
}

impl Reply {
    fn empty(persona: &str) -> Self {
        Self {
            persona: persona.to_string(),
            text: String::new(),
            suggested_phase: None,
            fallback: false,
        }
    }

    fn fallback(persona: &str) -> Self {
        Self {
            persona: persona.to_string(),
            text: FALLBACK_REPLY.to_string(),
            suggested_phase: None,
            fallback: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Builds the prompt, makes a single attempt and interprets the reply.
#[derive(Clone)]
pub struct DialogueGateway {
    completion: Arc<dyn CompletionPort>,
    random: Arc<dyn RandomPort>,
    timeout: Duration,
}

impl DialogueGateway {
    pub fn new(
        completion: Arc<dyn CompletionPort>,
        random: Arc<dyn RandomPort>,
        timeout: Duration,
    ) -> Self {
        Self {
            completion,
            random,
            timeout,
        }
    }

    pub fn pick_persona(&self) -> String {
        pick(self.random.as_ref(), &FALLBACK_PERSONAS)
            .copied()
            .unwrap_or("Echo")
            .to_string()
    }

    pub async fn request_reply(&self, message: &str, player_name: &str, phase: Phase) -> Reply {
        let persona = self.pick_persona();
        self.request_reply_as(&persona, message, player_name, phase)
            .await
    }

    pub async fn request_reply_as(
        &self,
        persona: &str,
        message: &str,
        player_name: &str,
        phase: Phase,
    ) -> Reply {
        let message = sanitize_input(message);
        if message.is_empty() {
            return Reply::empty(persona);
        }

        let request = build_request(persona, player_name, &message, phase);
        let body = match tokio::time::timeout(self.timeout, self.completion.complete(request)).await
        {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, persona = %persona, "Completion request failed");
                return Reply::fallback(persona);
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    persona = %persona,
                    "Completion request timed out"
                );
                return Reply::fallback(persona);
            }
        };

        let text = strip_reasoning(&extract_message(&body));
        let directive = parse_directive(&text, phase);
        tracing::debug!(
            persona = %persona,
            explicit = directive.explicit,
            phase = %directive.phase,
            "Parsed companion reply"
        );

        Reply {
            persona: persona.to_string(),
            text: directive.text,
            suggested_phase: directive.explicit.then_some(directive.phase),
            fallback: false,
        }
    }
}
