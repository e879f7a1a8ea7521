//! Actor, sound and game-mode vocabulary shared with the world collaborator.

use serde::{Deserialize, Serialize};

use crate::ids::{ActorId, PlayerId};
use crate::value_objects::world::{ItemStack, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Companion,
    ArmorStand,
    Wolf,
    Cat,
    IronGolem,
    Villager,
    /// Farm animals and other untamable passive mobs.
    PassiveAnimal,
    DroppedItem,
    Other,
}

impl ActorKind {
    pub fn is_pet(self) -> bool {
        matches!(self, ActorKind::Wolf | ActorKind::Cat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActorInfo {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Vec3,
    pub owner: Option<PlayerId>,
    /// The carried stack, for dropped items.
    pub item: Option<ItemStack>,
}

/// Which nearby actors to return. Empty `kinds` matches every kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActorQuery {
    pub kinds: Vec<ActorKind>,
    pub owned_by: Option<PlayerId>,
}

impl ActorQuery {
    pub fn of(kinds: &[ActorKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            owned_by: None,
        }
    }

    pub fn owned_by(mut self, owner: PlayerId) -> Self {
        self.owned_by = Some(owner);
        self
    }

    pub fn matches(&self, actor: &ActorInfo) -> bool {
        let kind_ok = self.kinds.is_empty() || self.kinds.contains(&actor.kind);
        let owner_ok = self.owned_by.is_none() || actor.owner == self.owned_by;
        kind_ok && owner_ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    ChestOpen,
    ChestClose,
    WoodenTrapdoorClose,
    PlayerHurt,
    CaveAmbient,
    CatHiss,
    WolfGrowl,
    VillagerNo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub effect: SoundEffect,
    pub volume: f32,
    pub pitch: f32,
}

impl SoundCue {
    pub fn new(effect: SoundEffect, volume: f32, pitch: f32) -> Self {
        Self {
            effect,
            volume,
            pitch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Chest,
    Legs,
    Feet,
}

/// Something the world should make an actor do.
#[derive(Debug, Clone, PartialEq)]
pub enum ActorCommand {
    Sit,
    /// Turn to a yaw in degrees.
    Face { yaw: f32 },
    Target { player: PlayerId },
    MoveTo { target: Vec3, speed: f64 },
    Equip { slot: EquipmentSlot, stack: ItemStack },
    PlaySound { cue: SoundCue },
}
