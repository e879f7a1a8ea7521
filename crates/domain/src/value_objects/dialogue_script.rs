//! Data-driven scripted dialogue.
//!
//! A [`ScriptBook`] holds every scripted line the companion can say and the
//! keyword rules that pick a reply. Rules are matched on whole words of the
//! lower-cased message, first match wins.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::phase::Phase;
use crate::value_objects::message_queue::{LineStyle, DEFAULT_MESSAGE_DELAY};

const NAME_PLACEHOLDER: &str = "{name}";

/// One scripted line. In JSON either a bare string or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScriptLineRepr")]
pub struct ScriptLine {
    pub text: String,
    /// Ticks after the previous queued line.
    pub delay: u32,
    pub style: LineStyle,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptLineRepr {
    Text(String),
    Full {
        text: String,
        #[serde(default = "default_delay")]
        delay: u32,
        #[serde(default)]
        style: LineStyle,
    },
}

fn default_delay() -> u32 {
    DEFAULT_MESSAGE_DELAY
}

impl From<ScriptLineRepr> for ScriptLine {
    fn from(repr: ScriptLineRepr) -> Self {
        match repr {
            ScriptLineRepr::Text(text) => ScriptLine::new(text),
            ScriptLineRepr::Full { text, delay, style } => ScriptLine { text, delay, style },
        }
    }
}

impl ScriptLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delay: DEFAULT_MESSAGE_DELAY,
            style: LineStyle::Plain,
        }
    }

    /// Line text with `{name}` replaced by the companion's name.
    pub fn render(&self, companion_name: &str) -> String {
        self.text.replace(NAME_PLACEHOLDER, companion_name)
    }
}

/// What a matched rule does besides speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    #[default]
    None,
    /// Treat the next non-blank message as the companion's new name.
    AwaitName,
    /// The player answered the introduction; stop the phase one script.
    EndIntroduction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueRule {
    pub patterns: Vec<String>,
    pub responses: Vec<ScriptLine>,
    #[serde(default)]
    pub effect: RuleEffect,
}

impl DialogueRule {
    pub fn matches(&self, words: &[String]) -> bool {
        self.patterns.iter().any(|p| contains_phrase(words, p))
    }
}

/// A value per companion phase that has scripted content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTable<T> {
    pub phase_one: T,
    pub phase_two: T,
    pub phase_three: T,
    pub phase_four: T,
}

impl<T> PhaseTable<T> {
    pub fn get(&self, phase: Phase) -> Option<&T> {
        match phase {
            Phase::None => None,
            Phase::One => Some(&self.phase_one),
            Phase::Two => Some(&self.phase_two),
            Phase::Three => Some(&self.phase_three),
            Phase::Four => Some(&self.phase_four),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientLine {
    /// Chance per tick is `1 / one_in`.
    pub one_in: u32,
    pub line: ScriptLine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleScript {
    pub after_ticks: u32,
    /// Ticks of silence granted after the idle lines before it can trigger again.
    pub grace_ticks: u32,
    pub lines: Vec<ScriptLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBook {
    pub initial_greeting: Vec<ScriptLine>,
    #[serde(default)]
    pub return_greetings: PhaseTable<Vec<ScriptLine>>,
    #[serde(default)]
    pub rules: PhaseTable<Vec<DialogueRule>>,
    pub name_mentioned: Vec<ScriptLine>,
    pub renamed: Vec<ScriptLine>,
    pub attack_reaction: Vec<ScriptLine>,
    pub escalation: Vec<ScriptLine>,
    pub phase_change_narration: ScriptLine,
    pub idle: IdleScript,
    #[serde(default)]
    pub ambient: PhaseTable<Option<AmbientLine>>,
    pub acceptance_phrases: Vec<String>,
    pub rejection_phrases: Vec<String>,
}

impl ScriptBook {
    /// Reject books that would make the matcher or timers misbehave.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.rejection_phrases.iter().all(|p| p.trim().is_empty()) {
            return Err(DomainError::validation("Script book has no rejection phrases"));
        }
        for phase in [Phase::One, Phase::Two, Phase::Three, Phase::Four] {
            let rules = self.rules.get(phase).map(Vec::as_slice).unwrap_or_default();
            for (index, rule) in rules.iter().enumerate() {
                if rule.patterns.iter().all(|p| p.trim().is_empty()) {
                    return Err(DomainError::validation(format!(
                        "Rule {index} for {phase} has no patterns"
                    )));
                }
            }
            if let Some(Some(ambient)) = self.ambient.get(phase) {
                if ambient.one_in == 0 {
                    return Err(DomainError::validation(format!(
                        "Ambient line for {phase} has a zero chance divisor"
                    )));
                }
            }
        }
        if self.idle.after_ticks == 0 {
            return Err(DomainError::validation("Idle script must wait at least one tick"));
        }
        Ok(())
    }

    pub fn is_acceptance(&self, message: &str) -> bool {
        let words = words_of(message);
        self.acceptance_phrases.iter().any(|p| contains_phrase(&words, p))
    }

    /// A rejection is a rejection phrase in a message that is not also an acceptance.
    pub fn is_rejection(&self, message: &str) -> bool {
        let words = words_of(message);
        if self.acceptance_phrases.iter().any(|p| contains_phrase(&words, p)) {
            return false;
        }
        self.rejection_phrases.iter().any(|p| contains_phrase(&words, p))
    }

    /// First rule for `phase` matching `message`.
    pub fn match_rule(&self, phase: Phase, message: &str) -> Option<&DialogueRule> {
        let words = words_of(message);
        self.rules
            .get(phase)?
            .iter()
            .find(|rule| rule.matches(&words))
    }
}

/// Lower-cased words of a message. Apostrophes stay inside words.
pub fn words_of(message: &str) -> Vec<String> {
    message
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `phrase` occurs in `words` as a run of whole words.
pub fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let needle = words_of(phrase);
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words.windows(needle.len()).any(|window| window == needle.as_slice())
}
