//! Value objects: immutable vocabulary and small self-contained state machines.

mod actors;
mod chat_history;
mod dialogue_script;
mod message_queue;
mod scare_state;
mod world;

pub use actors::{
    ActorCommand, ActorInfo, ActorKind, ActorQuery, EquipmentSlot, GameMode, SoundCue,
    SoundEffect,
};
pub use chat_history::{possessive_to_shared, ChatHistory, CHAT_HISTORY_CAPACITY};
pub use dialogue_script::{
    contains_phrase, words_of, AmbientLine, DialogueRule, IdleScript, PhaseTable, RuleEffect,
    ScriptBook, ScriptLine,
};
pub use message_queue::{
    LineStyle, MessageQueue, ScheduledMessage, DEFAULT_MESSAGE_DELAY, SPEECH_COOLDOWN_TICKS,
};
pub use scare_state::{CooldownTick, CooldownWindow, ScareState, INITIAL_SCARE_COOLDOWN};
pub use world::{
    BlockKind, BlockPart, BlockPos, BlockState, Direction, DoorMaterial, DyeColor, Flower,
    ItemKind, ItemStack, Vec3,
};
