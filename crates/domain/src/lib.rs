extern crate self as minefriend_domain;

pub mod entities;
pub mod error;
pub mod ids;
pub mod phase;
pub mod value_objects;

pub use entities::{
    CompanionRecord, FriendProfile, BUILT_IN_SKIN_COUNT, MAX_NAME_CHARS, PLAYER_SKIN_INDEX,
    RANDOM_NAMES,
};
pub use error::DomainError;
pub use ids::{ActorId, PlayerId, SessionId, WorldId};
pub use phase::{accepts_suggestion, next_phase, Phase};
pub use value_objects::{
    ActorCommand, ActorInfo, ActorKind, ActorQuery, BlockKind, BlockPart, BlockPos, BlockState,
    ChatHistory, CooldownTick, CooldownWindow, DialogueRule, Direction, DoorMaterial, DyeColor,
    EquipmentSlot, Flower, GameMode, ItemKind, ItemStack, LineStyle, MessageQueue, RuleEffect,
    ScareState, ScheduledMessage, ScriptBook, ScriptLine, SoundCue, SoundEffect, Vec3,
    DEFAULT_MESSAGE_DELAY, SPEECH_COOLDOWN_TICKS,
};
