//! Keyword-rule dialogue driven by the script book.

use minefriend_domain::value_objects::{contains_phrase, possessive_to_shared, words_of, AmbientLine};
use minefriend_domain::{ChatHistory, LineStyle, Phase, RuleEffect, ScriptBook, ScriptLine};

use crate::infrastructure::ports::RandomPort;
use crate::infrastructure::random::one_in;

/// A line ready for the message queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub style: LineStyle,
    pub delay: u32,
}

impl Utterance {
    fn render(line: &ScriptLine, name: &str) -> Self {
        Self {
            text: line.render(name),
            style: line.style,
            delay: line.delay,
        }
    }
}

fn render_all(lines: &[ScriptLine], name: &str) -> Vec<Utterance> {
    lines.iter().map(|l| Utterance::render(l, name)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptedReply {
    pub lines: Vec<Utterance>,
    pub effect: RuleEffect,
}

/// What the scripted path needs to know about one player line.
pub struct ScriptedTurn<'a> {
    pub phase: Phase,
    pub message: &'a str,
    pub companion_name: &'a str,
    pub script_disabled: bool,
    pub history: &'a ChatHistory,
    /// For phase three mimicry: echo the newest history line instead of the oldest.
    pub mimic_newest: bool,
}

pub struct ScriptedDialogue {
    book: ScriptBook,
}

impl ScriptedDialogue {
    pub fn new(book: ScriptBook) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &ScriptBook {
        &self.book
    }

    pub fn initial_greeting(&self, name: &str) -> Vec<Utterance> {
        render_all(&self.book.initial_greeting, name)
    }

    pub fn return_greeting(&self, phase: Phase, name: &str) -> Vec<Utterance> {
        self.book
            .return_greetings
            .get(phase)
            .map(|lines| render_all(lines, name))
            .unwrap_or_default()
    }

    pub fn phase_change_narration(&self) -> Utterance {
        Utterance::render(&self.book.phase_change_narration, "")
    }

    pub fn attack_reaction(&self, name: &str) -> Vec<Utterance> {
        render_all(&self.book.attack_reaction, name)
    }

    pub fn escalation(&self, name: &str) -> Vec<Utterance> {
        render_all(&self.book.escalation, name)
    }

    pub fn renamed(&self, name: &str) -> Vec<Utterance> {
        render_all(&self.book.renamed, name)
    }

    pub fn idle_lines(&self, name: &str) -> Vec<Utterance> {
        render_all(&self.book.idle.lines, name)
    }

    pub fn idle_after_ticks(&self) -> u32 {
        self.book.idle.after_ticks
    }

    pub fn idle_grace_ticks(&self) -> u32 {
        self.book.idle.grace_ticks
    }

    pub fn ambient(&self, phase: Phase) -> Option<&AmbientLine> {
        self.book.ambient.get(phase)?.as_ref()
    }

    /// Roll the phase's ambient line, if it has one.
    pub fn roll_ambient(&self, phase: Phase, name: &str, random: &dyn RandomPort) -> Option<Utterance> {
        let ambient = self.ambient(phase)?;
        one_in(random, ambient.one_in).then(|| Utterance::render(&ambient.line, name))
    }

    pub fn is_rejection(&self, message: &str) -> bool {
        self.book.is_rejection(message)
    }

    /// Whether the player said the companion's name as a word or phrase.
    pub fn mentions_name(message: &str, name: &str) -> bool {
        !name.trim().is_empty() && contains_phrase(&words_of(message), name)
    }

    /// Reply to one player line.
    ///
    /// The name-mention line comes first, then the first matching rule for
    /// the phase. Phase three falls back to mimicking chat history.
    pub fn respond(&self, turn: &ScriptedTurn<'_>) -> ScriptedReply {
        let name = turn.companion_name;
        let mut reply = ScriptedReply::default();

        if Self::mentions_name(turn.message, name) {
            reply.lines.extend(render_all(&self.book.name_mentioned, name));
        }

        if turn.phase == Phase::One && turn.script_disabled {
            return reply;
        }

        if let Some(rule) = self.book.match_rule(turn.phase, turn.message) {
            reply.lines.extend(render_all(&rule.responses, name));
            reply.effect = rule.effect;
            return reply;
        }

        if turn.phase == Phase::Three {
            if let Some(text) = self.mimic(turn) {
                reply.lines.push(Utterance::render(&ScriptLine::new(text), name));
            }
        }
        reply
    }

    fn mimic(&self, turn: &ScriptedTurn<'_>) -> Option<String> {
        let message = turn.message.trim();
        if message.is_empty() {
            return None;
        }
        if let Some(line) = turn.history.mimic(turn.mimic_newest) {
            return Some(line);
        }
        if contains_phrase(&words_of(message), "house") {
            Some(possessive_to_shared(message))
        } else {
            Some(message.to_string())
        }
    }
}
