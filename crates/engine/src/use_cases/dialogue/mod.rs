//! Companion dialogue: the model path and the scripted path.

mod gateway;
mod prompt;
mod reply;
mod scripted;

pub use gateway::{DialogueGateway, Reply, FALLBACK_REPLY};
pub use prompt::{build_request, system_prompt, user_turn, FALLBACK_PERSONAS, KICKOFF_MESSAGE};
pub use reply::{
    extract_message, normalize_whitespace, parse_directive, sanitize_input, strip_reasoning,
    PhaseDirective,
};
pub use scripted::{ScriptedDialogue, ScriptedReply, ScriptedTurn, Utterance};
