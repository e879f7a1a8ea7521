//! Ports onto the running simulation.
//!
//! All of these are called from the tick thread only and must not block.

use minefriend_domain::{
    ActorCommand, ActorId, ActorInfo, ActorQuery, BlockPos, BlockState, GameMode, ItemStack,
    LineStyle, Phase, PlayerId, SoundCue, Vec3, WorldId,
};

/// Cells, containers, sounds and nearby actors of a world.
#[cfg_attr(test, mockall::automock)]
pub trait WorldPort: Send + Sync {
    fn block(&self, world: WorldId, pos: BlockPos) -> BlockState;
    fn set_block(&self, world: WorldId, pos: BlockPos, state: BlockState);
    /// Whether every cell within `radius` of `center` is loaded.
    fn is_area_loaded(&self, world: WorldId, center: BlockPos, radius: i32) -> bool;
    /// First free cell above the highest motion-blocking block of a column.
    fn surface(&self, world: WorldId, x: i32, z: i32) -> BlockPos;
    fn min_build_height(&self, world: WorldId) -> i32;
    fn set_sign_text(&self, world: WorldId, pos: BlockPos, front: &str, back: Option<String>);
    fn container_size(&self, world: WorldId, pos: BlockPos) -> Option<usize>;
    fn set_container_slot(&self, world: WorldId, pos: BlockPos, slot: usize, stack: ItemStack);
    /// Drop a stack as a pickup at a cell.
    fn drop_item(&self, world: WorldId, pos: BlockPos, stack: ItemStack);
    /// A floating stack that never despawns and cannot be picked up straight away.
    fn spawn_item_display(&self, world: WorldId, at: Vec3, stack: ItemStack);
    fn play_sound(&self, world: WorldId, at: BlockPos, cue: SoundCue);
    fn nearby_actors(
        &self,
        world: WorldId,
        center: Vec3,
        radius: f64,
        query: &ActorQuery,
    ) -> Vec<ActorInfo>;
    fn command_actor(&self, world: WorldId, actor: ActorId, command: ActorCommand);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub world: WorldId,
    pub position: Vec3,
    pub game_mode: GameMode,
}

impl PlayerSnapshot {
    pub fn block(&self) -> BlockPos {
        self.position.block()
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PlayerPort: Send + Sync {
    /// `None` once the player has left.
    fn snapshot(&self, player: PlayerId) -> Option<PlayerSnapshot>;
    fn set_game_mode(&self, player: PlayerId, mode: GameMode);
    fn teleport(&self, player: PlayerId, to: Vec3);
    fn hurt(&self, player: PlayerId, attacker: ActorId, amount: f32);
    fn first_inventory_item(&self, player: PlayerId) -> Option<ItemStack>;
    fn send_system_message(&self, player: PlayerId, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionAppearance {
    pub name: String,
    pub skin_index: i32,
}

/// The companion actor itself.
#[cfg_attr(test, mockall::automock)]
pub trait CompanionPort: Send + Sync {
    fn spawn(
        &self,
        owner: PlayerId,
        world: WorldId,
        at: Vec3,
        appearance: &CompanionAppearance,
    ) -> Option<ActorId>;
    fn despawn(&self, companion: ActorId);
    fn is_present(&self, companion: ActorId) -> bool;
    fn position(&self, companion: ActorId) -> Option<Vec3>;
    fn find_owned_by(&self, owner: PlayerId) -> Option<ActorId>;
    fn apply_appearance(&self, companion: ActorId, appearance: &CompanionAppearance);
    fn notify_phase(&self, companion: ActorId, phase: Phase);
    fn navigate_to(&self, companion: ActorId, target: Vec3, speed: f64);
    fn look_at(&self, companion: ActorId, target: Vec3);
    fn set_speech_cooldown(&self, companion: ActorId, ticks: u32);
    fn can_speak(&self, companion: ActorId) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: Option<String>,
    pub text: String,
    pub style: LineStyle,
}

impl ChatLine {
    pub fn from_companion(name: &str, text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            speaker: Some(name.to_string()),
            text: text.into(),
            style,
        }
    }

    /// `<Name> text`, or just the text for unattributed lines.
    pub fn render(&self) -> String {
        match &self.speaker {
            Some(speaker) => format!("<{speaker}> {}", self.text),
            None => self.text.clone(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ChatPort: Send + Sync {
    fn broadcast(&self, line: &ChatLine);
}
