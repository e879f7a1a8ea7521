//! Engine configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `COMPANION_LLM_URL` | `http://localhost:11434/api/chat` |
//! | `COMPANION_LLM_MODEL` | `qwen3` |
//! | `COMPANION_LLM_CONNECT_TIMEOUT_SECS` | `15` |
//! | `COMPANION_LLM_TIMEOUT_SECS` | `60` |
//! | `COMPANION_MODEL_DIALOGUE` | `true` |
//! | `COMPANION_SCRIPTED_DIALOGUE` | `false` |
//! | `COMPANION_REPLY_DELAY_TICKS` | `20` |
//! | `COMPANION_SCRIPT_BOOK` | built-in script |

use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::completion_http::{DEFAULT_COMPLETION_MODEL, DEFAULT_COMPLETION_URL};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a boolean, got '{value}'")]
    InvalidBool { var: &'static str, value: String },
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub url: String,
    pub model: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeConfig {
    pub llm: LlmConfig,
    /// Ask the model for replies to chat and for join greetings.
    pub model_dialogue: bool,
    /// Run the keyword rule tables and the scripted greetings.
    pub scripted_dialogue: bool,
    /// Ticks between a reply arriving and the companion saying it.
    pub reply_delay_ticks: u32,
    pub script_book: Option<PathBuf>,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            model_dialogue: true,
            scripted_dialogue: false,
            reply_delay_ticks: 20,
            script_book: None,
        }
    }
}

impl NarrativeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string());

        let url = match get("COMPANION_LLM_URL") {
            Some(v) if v.is_empty() => {
                return Err(ConfigError::Empty {
                    var: "COMPANION_LLM_URL",
                })
            }
            Some(v) => v,
            None => defaults.llm.url,
        };
        let model = match get("COMPANION_LLM_MODEL") {
            Some(v) if v.is_empty() => {
                return Err(ConfigError::Empty {
                    var: "COMPANION_LLM_MODEL",
                })
            }
            Some(v) => v,
            None => defaults.llm.model,
        };

        let connect_timeout = secs(
            "COMPANION_LLM_CONNECT_TIMEOUT_SECS",
            get("COMPANION_LLM_CONNECT_TIMEOUT_SECS"),
            defaults.llm.connect_timeout,
        )?;
        let request_timeout = secs(
            "COMPANION_LLM_TIMEOUT_SECS",
            get("COMPANION_LLM_TIMEOUT_SECS"),
            defaults.llm.request_timeout,
        )?;

        Ok(Self {
            llm: LlmConfig {
                url,
                model,
                connect_timeout,
                request_timeout,
            },
            model_dialogue: flag(
                "COMPANION_MODEL_DIALOGUE",
                get("COMPANION_MODEL_DIALOGUE"),
                defaults.model_dialogue,
            )?,
            scripted_dialogue: flag(
                "COMPANION_SCRIPTED_DIALOGUE",
                get("COMPANION_SCRIPTED_DIALOGUE"),
                defaults.scripted_dialogue,
            )?,
            reply_delay_ticks: number(
                "COMPANION_REPLY_DELAY_TICKS",
                get("COMPANION_REPLY_DELAY_TICKS"),
                u64::from(defaults.reply_delay_ticks),
            )?
            .try_into()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "COMPANION_REPLY_DELAY_TICKS",
                value: "out of range".to_string(),
            })?,
            script_book: get("COMPANION_SCRIPT_BOOK")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn flag(var: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}

fn number(var: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

fn secs(
    var: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    number(var, value, default.as_secs()).map(Duration::from_secs)
}
