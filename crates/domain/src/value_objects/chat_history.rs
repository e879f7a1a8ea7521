//! Recent player chat, kept for mimicry.

use std::collections::VecDeque;

pub const CHAT_HISTORY_CAPACITY: usize = 30;

/// Bounded history of what the player said, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHistory {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::with_capacity(CHAT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Remember a line. Blank lines are ignored; the oldest line is evicted when full.
    pub fn record(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub fn oldest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    pub fn newest(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Echo back one end of the history with the player's "my" turned into "our".
    pub fn mimic(&self, newest: bool) -> Option<String> {
        let line = if newest { self.newest() } else { self.oldest() }?;
        Some(possessive_to_shared(line))
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the whole word "my" with "our", keeping the original capitalisation style.
pub fn possessive_to_shared(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut word = String::new();
    for ch in line.chars() {
        if ch.is_alphanumeric() || ch == '\'' {
            word.push(ch);
        } else {
            flush_word(&mut out, &mut word);
            out.push(ch);
        }
    }
    flush_word(&mut out, &mut word);
    out
}

fn flush_word(out: &mut String, word: &mut String) {
    if word.eq_ignore_ascii_case("my") {
        let replacement = match word.as_str() {
            "MY" => "OUR",
            "My" | "mY" => "Our",
            _ => "our",
        };
        out.push_str(replacement);
    } else {
        out.push_str(word);
    }
    word.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut history = ChatHistory::new();
        for i in 0..35 {
            history.record(&format!("line {i}"));
        }
        assert_eq!(history.len(), 30);
        assert_eq!(history.oldest(), Some("line 5"));
        assert_eq!(history.newest(), Some("line 34"));
    }

    #[test]
    fn ignores_blank_lines() {
        let mut history = ChatHistory::new();
        history.record("   ");
        history.record("");
        assert!(history.is_empty());
    }

    #[test]
    fn mimic_swaps_whole_word_only() {
        assert_eq!(
            possessive_to_shared("My house is my castle, mystery solved"),
            "Our house is our castle, mystery solved"
        );
    }

    #[test]
    fn mimic_picks_requested_end() {
        let mut history = ChatHistory::new();
        history.record("this is my pickaxe");
        history.record("hello there");
        assert_eq!(history.mimic(false).as_deref(), Some("this is our pickaxe"));
        assert_eq!(history.mimic(true).as_deref(), Some("hello there"));
        assert!(ChatHistory::new().mimic(true).is_none());
    }
}
