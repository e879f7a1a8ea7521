//! Delayed companion chat lines.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default gap between scripted lines, in ticks.
pub const DEFAULT_MESSAGE_DELAY: u32 = 40;

/// How long the companion stays quiet after saying something, in ticks.
pub const SPEECH_COOLDOWN_TICKS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Plain,
    /// Narration rather than speech.
    Italic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMessage {
    text: String,
    style: LineStyle,
    remaining_ticks: u32,
}

impl ScheduledMessage {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// FIFO of pending lines.
///
/// Each new line is delayed relative to the current tail, so remaining delays
/// never decrease from front to back and the front is always the next to fire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQueue {
    entries: VecDeque<ScheduledMessage>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_after(&mut self, text: impl Into<String>, style: LineStyle, delay_ticks: u32) {
        let tail = self.entries.back().map_or(0, |m| m.remaining_ticks);
        self.entries.push_back(ScheduledMessage {
            text: text.into(),
            style,
            remaining_ticks: delay_ticks.saturating_add(tail),
        });
    }

    pub fn schedule(&mut self, text: impl Into<String>) {
        self.schedule_after(text, LineStyle::Plain, DEFAULT_MESSAGE_DELAY);
    }

    /// Advance one tick and return every line that is now due, in order.
    pub fn tick(&mut self) -> Vec<ScheduledMessage> {
        for entry in &mut self.entries {
            entry.remaining_ticks = entry.remaining_ticks.saturating_sub(1);
        }
        let mut due = Vec::new();
        while self
            .entries
            .front()
            .is_some_and(|m| m.remaining_ticks == 0)
        {
            if let Some(message) = self.entries.pop_front() {
                due.push(message);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledMessage> {
        self.entries.iter()
    }
}
