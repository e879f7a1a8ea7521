//! Interpreting completion response bodies.
//!
//! Backends disagree on the envelope, so extraction tries the known shapes in
//! order and falls back to the raw body. Nothing here can fail.

use std::sync::LazyLock;

use minefriend_domain::Phase;
use regex_lite::Regex;
use serde_json::Value;

static PHASE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\[\s*PHASE\s*:\s*(\d+)\s*\]\]").expect("valid regex")
});

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("valid regex"));

/// Display text plus the phase the reply asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDirective {
    pub text: String,
    /// The requested phase, or the fallback when there was no usable directive.
    pub phase: Phase,
    /// Whether a directive resolving to a known phase was present.
    pub explicit: bool,
}

/// Pull the message text out of a response body.
pub fn extract_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    match parsed {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Object(_) => from_envelope(&parsed).unwrap_or_else(|| body.to_string()),
        _ => body.to_string(),
    }
}

fn from_envelope(object: &Value) -> Option<String> {
    if let Some(error) = object.get("error") {
        match error {
            Value::String(text) => return Some(text.clone()),
            Value::Object(_) => {
                if let Some(text) = error.get("message").and_then(Value::as_str) {
                    return Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    if let Some(first) = object.get("choices").and_then(|c| c.get(0)) {
        if let Some(text) = first
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
        {
            return Some(text.to_string());
        }
        if let Some(text) = first.get("text").and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }

    if let Some(text) = object.get("response").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    match object.get("message") {
        Some(Value::String(text)) => Some(text.clone()),
        Some(message) => message
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string),
        None => None,
    }
}

pub fn strip_reasoning(text: &str) -> String {
    THINK_BLOCK.replace_all(text, " ").into_owned()
}

/// Find the phase directive, strip every occurrence and normalize whitespace.
///
/// The last directive wins. Digits that do not name a phase are discarded.
pub fn parse_directive(text: &str, fallback: Phase) -> PhaseDirective {
    let requested = PHASE_DIRECTIVE
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<i64>().ok())
        .and_then(|id| Phase::try_from(id).ok());

    let stripped = PHASE_DIRECTIVE.replace_all(text, " ");
    PhaseDirective {
        text: normalize_whitespace(&stripped),
        phase: requested.unwrap_or(fallback),
        explicit: requested.is_some(),
    }
}

/// CR/LF to spaces, runs collapsed, trimmed.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Player input with control characters removed.
pub fn sanitize_input(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    normalize_whitespace(&cleaned)
}
