//! The durable per-player companion profile.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ActorId, PlayerId};
use crate::phase::Phase;

/// Skin selector meaning "wear the owner's own skin".
pub const PLAYER_SKIN_INDEX: i32 = -1;

/// Number of built-in companion skins.
pub const BUILT_IN_SKIN_COUNT: i32 = 3;

/// Longest name the companion will accept.
pub const MAX_NAME_CHARS: usize = 16;

/// Names a fresh companion picks from.
pub const RANDOM_NAMES: [&str; 10] = [
    "Eli", "Nova", "Ash", "Rowan", "Mira", "Kai", "Luca", "Ivy", "Avery", "Robin",
];

/// Persistent companion state for one player.
///
/// Field names follow the save blob layout. Hardcore mode can be switched on
/// but never off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FriendProfile {
    owner: PlayerId,
    #[serde(rename = "FriendEntity", default, skip_serializing_if = "Option::is_none")]
    companion: Option<ActorId>,
    #[serde(rename = "FriendName")]
    name: String,
    skin_index: i32,
    phase: Phase,
    #[serde(default)]
    negatives: u32,
    #[serde(rename = "HardcoreActive", default)]
    hardcore: bool,
    #[serde(rename = "PhaseOneScriptDisabled", default)]
    script_disabled: bool,
}

impl FriendProfile {
    /// A brand new companion, starting in phase one.
    pub fn new(owner: PlayerId, name: impl Into<String>, skin_index: i32) -> Self {
        Self {
            owner,
            companion: None,
            name: truncate_name(name.into().trim()),
            skin_index,
            phase: Phase::One,
            negatives: 0,
            hardcore: false,
            script_disabled: false,
        }
    }

    /// Rebuild a profile from what a companion actor remembers about itself.
    pub fn restored(
        owner: PlayerId,
        companion: ActorId,
        name: impl Into<String>,
        phase: Phase,
        skin_index: i32,
    ) -> Self {
        Self {
            owner,
            companion: Some(companion),
            name: truncate_name(name.into().trim()),
            skin_index,
            phase,
            negatives: 0,
            hardcore: false,
            script_disabled: false,
        }
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn companion(&self) -> Option<ActorId> {
        self.companion
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skin_index(&self) -> i32 {
        self.skin_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn negatives(&self) -> u32 {
        self.negatives
    }

    pub fn is_hardcore(&self) -> bool {
        self.hardcore
    }

    pub fn is_script_disabled(&self) -> bool {
        self.script_disabled
    }

    pub fn mimics_owner(&self) -> bool {
        self.skin_index == PLAYER_SKIN_INDEX
    }

    /// Move to `phase`, returning the previous phase if anything changed.
    ///
    /// Entering phase four switches the companion to the owner's skin and
    /// turns hardcore mode on.
    pub fn enter_phase(&mut self, phase: Phase) -> Option<Phase> {
        if phase == self.phase {
            return None;
        }
        let previous = self.phase;
        self.phase = phase;
        if phase == Phase::Four {
            self.skin_index = PLAYER_SKIN_INDEX;
            self.hardcore = true;
        }
        Some(previous)
    }

    /// Count one more rejection and return the running total.
    pub fn record_rejection(&mut self) -> u32 {
        self.negatives = self.negatives.saturating_add(1);
        self.negatives
    }

    pub fn disable_script(&mut self) -> bool {
        let changed = !self.script_disabled;
        self.script_disabled = true;
        changed
    }

    pub fn enable_hardcore(&mut self) -> bool {
        let changed = !self.hardcore;
        self.hardcore = true;
        changed
    }

    pub fn use_owner_skin(&mut self) -> bool {
        let changed = self.skin_index != PLAYER_SKIN_INDEX;
        self.skin_index = PLAYER_SKIN_INDEX;
        changed
    }

    /// Give the companion a new name, cut to [`MAX_NAME_CHARS`].
    pub fn rename(&mut self, name: &str) -> Result<&str, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Companion name cannot be empty"));
        }
        self.name = truncate_name(trimmed);
        Ok(&self.name)
    }

    pub fn bind_companion(&mut self, companion: ActorId) -> bool {
        let changed = self.companion != Some(companion);
        self.companion = Some(companion);
        changed
    }

    pub fn clear_companion(&mut self) -> Option<ActorId> {
        self.companion.take()
    }
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_CHARS).collect()
}
