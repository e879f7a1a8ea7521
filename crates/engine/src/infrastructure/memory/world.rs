//! A small flat world held in memory.
//!
//! Cells default to a flat layered terrain (grass on dirt on stone) inside a
//! square loaded area; explicit writes override the terrain per cell.

use std::sync::Mutex;

use dashmap::DashMap;
use minefriend_domain::{
    ActorCommand, ActorId, ActorInfo, ActorKind, ActorQuery, BlockKind, BlockPos, BlockState,
    GameMode, ItemStack, Phase, PlayerId, SoundCue, Vec3, WorldId,
};

use crate::infrastructure::ports::{
    CompanionAppearance, CompanionPort, PlayerPort, PlayerSnapshot, WorldPort,
};

/// Y of the grass layer.
pub const FLAT_GROUND_Y: i32 = 64;
pub const CHEST_SLOTS: usize = 27;

const MIN_BUILD_HEIGHT: i32 = -64;
const DIRT_DEPTH: i32 = 3;
/// How far above the ground `surface` looks for placed blocks.
const SURFACE_SCAN_HEIGHT: i32 = 48;
const PLAYER_HEALTH: f32 = 20.0;
/// Blocks a companion walks per tick at speed 1.0.
const WALK_PER_TICK: f64 = 0.2;

#[derive(Debug, Clone)]
struct MemoryPlayer {
    snapshot: PlayerSnapshot,
    online: bool,
    inventory: Vec<ItemStack>,
    health: f32,
    messages: Vec<String>,
}

/// Everything the world tracks about the companion actor.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionState {
    pub owner: PlayerId,
    pub world: WorldId,
    pub position: Vec3,
    pub appearance: CompanionAppearance,
    pub phase: Phase,
    pub speech_cooldown: u32,
    pub destination: Option<(Vec3, f64)>,
    pub looking_at: Option<Vec3>,
}

#[derive(Default)]
pub struct MemoryWorld {
    extents: DashMap<WorldId, i32>,
    blocks: DashMap<(WorldId, BlockPos), BlockState>,
    signs: DashMap<(WorldId, BlockPos), (String, Option<String>)>,
    containers: DashMap<(WorldId, BlockPos), Vec<Option<ItemStack>>>,
    displays: Mutex<Vec<(WorldId, Vec3, ItemStack)>>,
    sounds: Mutex<Vec<(WorldId, BlockPos, SoundCue)>>,
    actors: DashMap<ActorId, (WorldId, ActorInfo)>,
    commands: Mutex<Vec<(ActorId, ActorCommand)>>,
    players: DashMap<PlayerId, MemoryPlayer>,
    companions: DashMap<ActorId, CompanionState>,
    echo: bool,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// A world that prints system messages to stdout.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Register a flat world loaded for `half_extent` blocks around the origin.
    pub fn add_flat_world(&self, half_extent: i32) -> WorldId {
        let id = WorldId::new();
        self.extents.insert(id, half_extent.max(0));
        id
    }

    pub fn add_player(&self, name: &str, world: WorldId, position: Vec3) -> PlayerId {
        self.add_player_with_id(PlayerId::new(), name, world, position)
    }

    /// Register a player under a known id, e.g. one remembered across runs.
    pub fn add_player_with_id(
        &self,
        id: PlayerId,
        name: &str,
        world: WorldId,
        position: Vec3,
    ) -> PlayerId {
        self.players.insert(
            id,
            MemoryPlayer {
                snapshot: PlayerSnapshot {
                    id,
                    name: name.to_string(),
                    world,
                    position,
                    game_mode: GameMode::Survival,
                },
                online: true,
                inventory: Vec::new(),
                health: PLAYER_HEALTH,
                messages: Vec::new(),
            },
        );
        id
    }

    pub fn set_online(&self, player: PlayerId, online: bool) {
        if let Some(mut p) = self.players.get_mut(&player) {
            p.online = online;
        }
    }

    pub fn give_item(&self, player: PlayerId, stack: ItemStack) {
        if let Some(mut p) = self.players.get_mut(&player) {
            p.inventory.push(stack);
        }
    }

    pub fn add_actor(
        &self,
        world: WorldId,
        kind: ActorKind,
        position: Vec3,
        owner: Option<PlayerId>,
    ) -> ActorId {
        let id = ActorId::new();
        self.actors.insert(
            id,
            (
                world,
                ActorInfo {
                    id,
                    kind,
                    position,
                    owner,
                    item: None,
                },
            ),
        );
        id
    }

    /// Player state regardless of whether they are online.
    pub fn player(&self, player: PlayerId) -> Option<PlayerSnapshot> {
        self.players.get(&player).map(|p| p.snapshot.clone())
    }

    pub fn health(&self, player: PlayerId) -> Option<f32> {
        self.players.get(&player).map(|p| p.health)
    }

    pub fn system_messages(&self, player: PlayerId) -> Vec<String> {
        self.players
            .get(&player)
            .map(|p| p.messages.clone())
            .unwrap_or_default()
    }

    pub fn actor(&self, actor: ActorId) -> Option<ActorInfo> {
        self.actors.get(&actor).map(|a| a.1.clone())
    }

    pub fn actors_of(&self, kind: ActorKind) -> Vec<ActorInfo> {
        self.actors
            .iter()
            .filter(|a| a.1.kind == kind)
            .map(|a| a.1.clone())
            .collect()
    }

    pub fn commands_for(&self, actor: ActorId) -> Vec<ActorCommand> {
        self.commands
            .lock()
            .map(|c| {
                c.iter()
                    .filter(|(id, _)| *id == actor)
                    .map(|(_, cmd)| cmd.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn sounds(&self) -> Vec<SoundCue> {
        self.sounds
            .lock()
            .map(|s| s.iter().map(|(_, _, cue)| *cue).collect())
            .unwrap_or_default()
    }

    pub fn sign_text(&self, world: WorldId, pos: BlockPos) -> Option<(String, Option<String>)> {
        self.signs.get(&(world, pos)).map(|s| s.value().clone())
    }

    pub fn container(&self, world: WorldId, pos: BlockPos) -> Vec<Option<ItemStack>> {
        self.containers
            .get(&(world, pos))
            .map(|c| c.value().clone())
            .unwrap_or_default()
    }

    pub fn item_displays(&self) -> Vec<(Vec3, ItemStack)> {
        self.displays
            .lock()
            .map(|d| d.iter().map(|(_, at, stack)| (*at, *stack)).collect())
            .unwrap_or_default()
    }

    /// Cells that were explicitly written, with their current state.
    pub fn placed_blocks(&self, world: WorldId) -> Vec<(BlockPos, BlockState)> {
        let mut placed: Vec<_> = self
            .blocks
            .iter()
            .filter(|entry| entry.key().0 == world)
            .map(|entry| (entry.key().1, *entry.value()))
            .collect();
        placed.sort_by_key(|(pos, _)| *pos);
        placed
    }

    pub fn companion(&self, companion: ActorId) -> Option<CompanionState> {
        self.companions.get(&companion).map(|c| c.value().clone())
    }

    pub fn companion_count(&self) -> usize {
        self.companions.len()
    }

    /// One simulation tick of actor behaviour: speech cooldowns run down,
    /// early-phase companions follow their owner, and companions walk.
    pub fn advance_tick(&self) {
        for mut companion in self.companions.iter_mut() {
            companion.speech_cooldown = companion.speech_cooldown.saturating_sub(1);

            if companion.phase.companion_follows() {
                if let Some(owner) = self.snapshot(companion.owner) {
                    companion.destination = Some((owner.position, 1.0));
                }
            }

            if let Some((target, speed)) = companion.destination {
                let distance = companion.position.distance_sq(&target).sqrt();
                let step = WALK_PER_TICK * speed;
                if distance <= step.max(f64::EPSILON) {
                    companion.position = target;
                    companion.destination = None;
                } else {
                    let ratio = step / distance;
                    let from = companion.position;
                    companion.position = Vec3::new(
                        from.x + (target.x - from.x) * ratio,
                        from.y + (target.y - from.y) * ratio,
                        from.z + (target.z - from.z) * ratio,
                    );
                }
            }
        }
    }

    fn terrain(&self, world: WorldId, pos: BlockPos) -> BlockState {
        let Some(extent) = self.extents.get(&world).map(|e| *e) else {
            return BlockState::AIR;
        };
        if pos.x.abs() > extent || pos.z.abs() > extent {
            return BlockState::AIR;
        }
        let kind = if pos.y > FLAT_GROUND_Y || pos.y < MIN_BUILD_HEIGHT {
            BlockKind::Air
        } else if pos.y == FLAT_GROUND_Y {
            BlockKind::Grass
        } else if pos.y >= FLAT_GROUND_Y - DIRT_DEPTH {
            BlockKind::Dirt
        } else {
            BlockKind::Stone
        };
        BlockState::of(kind)
    }
}

/// Cells that stop a falling actor; decorations do not.
fn blocks_motion(kind: BlockKind) -> bool {
    !matches!(
        kind,
        BlockKind::Air
            | BlockKind::Torch
            | BlockKind::WallTorch
            | BlockKind::Flower(_)
            | BlockKind::Crop
            | BlockKind::OakSign
    )
}

impl WorldPort for MemoryWorld {
    fn block(&self, world: WorldId, pos: BlockPos) -> BlockState {
        self.blocks
            .get(&(world, pos))
            .map(|b| *b)
            .unwrap_or_else(|| self.terrain(world, pos))
    }

    fn set_block(&self, world: WorldId, pos: BlockPos, state: BlockState) {
        tracing::debug!(?pos, kind = ?state.kind, "Memory world cell changed");
        if state.kind != BlockKind::Chest {
            self.containers.remove(&(world, pos));
        }
        if state.kind != BlockKind::OakSign {
            self.signs.remove(&(world, pos));
        }
        self.blocks.insert((world, pos), state);
    }

    fn is_area_loaded(&self, world: WorldId, center: BlockPos, radius: i32) -> bool {
        let Some(extent) = self.extents.get(&world).map(|e| *e) else {
            return false;
        };
        center.x.abs() + radius <= extent && center.z.abs() + radius <= extent
    }

    fn surface(&self, world: WorldId, x: i32, z: i32) -> BlockPos {
        let top = FLAT_GROUND_Y + SURFACE_SCAN_HEIGHT;
        for y in (MIN_BUILD_HEIGHT..=top).rev() {
            let pos = BlockPos::new(x, y, z);
            if blocks_motion(self.block(world, pos).kind) {
                return pos.above();
            }
        }
        BlockPos::new(x, MIN_BUILD_HEIGHT, z)
    }

    fn min_build_height(&self, _world: WorldId) -> i32 {
        MIN_BUILD_HEIGHT
    }

    fn set_sign_text(&self, world: WorldId, pos: BlockPos, front: &str, back: Option<String>) {
        self.signs.insert((world, pos), (front.to_string(), back));
    }

    fn container_size(&self, world: WorldId, pos: BlockPos) -> Option<usize> {
        (self.block(world, pos).kind == BlockKind::Chest).then_some(CHEST_SLOTS)
    }

    fn set_container_slot(&self, world: WorldId, pos: BlockPos, slot: usize, stack: ItemStack) {
        if slot >= CHEST_SLOTS {
            return;
        }
        let mut slots = self
            .containers
            .entry((world, pos))
            .or_insert_with(|| vec![None; CHEST_SLOTS]);
        slots[slot] = Some(stack);
    }

    fn drop_item(&self, world: WorldId, pos: BlockPos, stack: ItemStack) {
        let id = self.add_actor(world, ActorKind::DroppedItem, pos.bottom_center(), None);
        if let Some(mut actor) = self.actors.get_mut(&id) {
            actor.1.item = Some(stack);
        }
    }

    fn spawn_item_display(&self, world: WorldId, at: Vec3, stack: ItemStack) {
        if let Ok(mut displays) = self.displays.lock() {
            displays.push((world, at, stack));
        }
    }

    fn play_sound(&self, world: WorldId, at: BlockPos, cue: SoundCue) {
        tracing::debug!(?at, effect = ?cue.effect, "Memory world sound");
        if let Ok(mut sounds) = self.sounds.lock() {
            sounds.push((world, at, cue));
        }
    }

    fn nearby_actors(
        &self,
        world: WorldId,
        center: Vec3,
        radius: f64,
        query: &ActorQuery,
    ) -> Vec<ActorInfo> {
        let radius_sq = radius * radius;
        self.actors
            .iter()
            .filter(|entry| entry.0 == world)
            .map(|entry| entry.1.clone())
            .filter(|actor| actor.position.distance_sq(&center) <= radius_sq)
            .filter(|actor| query.matches(actor))
            .collect()
    }

    fn command_actor(&self, _world: WorldId, actor: ActorId, command: ActorCommand) {
        if let ActorCommand::MoveTo { target, .. } = &command {
            if let Some(mut entry) = self.actors.get_mut(&actor) {
                entry.1.position = *target;
            }
        }
        if let Ok(mut commands) = self.commands.lock() {
            commands.push((actor, command));
        }
    }
}

impl PlayerPort for MemoryWorld {
    fn snapshot(&self, player: PlayerId) -> Option<PlayerSnapshot> {
        self.players
            .get(&player)
            .filter(|p| p.online)
            .map(|p| p.snapshot.clone())
    }

    fn set_game_mode(&self, player: PlayerId, mode: GameMode) {
        if let Some(mut p) = self.players.get_mut(&player) {
            p.snapshot.game_mode = mode;
        }
    }

    fn teleport(&self, player: PlayerId, to: Vec3) {
        if let Some(mut p) = self.players.get_mut(&player) {
            p.snapshot.position = to;
        }
    }

    fn hurt(&self, player: PlayerId, attacker: ActorId, amount: f32) {
        if let Some(mut p) = self.players.get_mut(&player) {
            p.health = (p.health - amount).max(0.0);
            tracing::debug!(player_id = %player, attacker = %attacker, health = p.health, "Memory player hurt");
        }
    }

    fn first_inventory_item(&self, player: PlayerId) -> Option<ItemStack> {
        self.players
            .get(&player)
            .and_then(|p| p.inventory.first().copied())
    }

    fn send_system_message(&self, player: PlayerId, text: &str) {
        if self.echo {
            println!("[system] {text}");
        }
        if let Some(mut p) = self.players.get_mut(&player) {
            p.messages.push(text.to_string());
        }
    }
}

impl CompanionPort for MemoryWorld {
    fn spawn(
        &self,
        owner: PlayerId,
        world: WorldId,
        at: Vec3,
        appearance: &CompanionAppearance,
    ) -> Option<ActorId> {
        if !self.extents.contains_key(&world) {
            return None;
        }
        let id = ActorId::new();
        self.companions.insert(
            id,
            CompanionState {
                owner,
                world,
                position: at,
                appearance: appearance.clone(),
                phase: Phase::None,
                speech_cooldown: 0,
                destination: None,
                looking_at: None,
            },
        );
        Some(id)
    }

    fn despawn(&self, companion: ActorId) {
        self.companions.remove(&companion);
    }

    fn is_present(&self, companion: ActorId) -> bool {
        self.companions.contains_key(&companion)
    }

    fn position(&self, companion: ActorId) -> Option<Vec3> {
        self.companions.get(&companion).map(|c| c.position)
    }

    fn find_owned_by(&self, owner: PlayerId) -> Option<ActorId> {
        self.companions
            .iter()
            .find(|c| c.owner == owner)
            .map(|c| *c.key())
    }

    fn apply_appearance(&self, companion: ActorId, appearance: &CompanionAppearance) {
        if let Some(mut c) = self.companions.get_mut(&companion) {
            c.appearance = appearance.clone();
        }
    }

    fn notify_phase(&self, companion: ActorId, phase: Phase) {
        if let Some(mut c) = self.companions.get_mut(&companion) {
            c.phase = phase;
            c.speech_cooldown = 0;
            if !phase.companion_follows() {
                c.destination = None;
            }
        }
    }

    fn navigate_to(&self, companion: ActorId, target: Vec3, speed: f64) {
        if let Some(mut c) = self.companions.get_mut(&companion) {
            c.destination = Some((target, speed));
        }
    }

    fn look_at(&self, companion: ActorId, target: Vec3) {
        if let Some(mut c) = self.companions.get_mut(&companion) {
            c.looking_at = Some(target);
        }
    }

    fn set_speech_cooldown(&self, companion: ActorId, ticks: u32) {
        if let Some(mut c) = self.companions.get_mut(&companion) {
            c.speech_cooldown = ticks;
        }
    }

    fn can_speak(&self, companion: ActorId) -> bool {
        self.companions
            .get(&companion)
            .is_some_and(|c| c.speech_cooldown == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> (MemoryWorld, WorldId) {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(32);
        (memory, id)
    }

    #[test]
    fn flat_terrain_layers() {
        let (memory, id) = world();
        assert_eq!(memory.block(id, BlockPos::new(0, 64, 0)).kind, BlockKind::Grass);
        assert_eq!(memory.block(id, BlockPos::new(0, 62, 0)).kind, BlockKind::Dirt);
        assert_eq!(memory.block(id, BlockPos::new(0, 10, 0)).kind, BlockKind::Stone);
        assert!(memory.block(id, BlockPos::new(0, 65, 0)).is_air());
        assert!(memory.block(id, BlockPos::new(40, 64, 0)).is_air());
    }

    #[test]
    fn surface_skips_decorations() {
        let (memory, id) = world();
        assert_eq!(memory.surface(id, 3, 3), BlockPos::new(3, 65, 3));

        memory.set_block(id, BlockPos::new(3, 65, 3), BlockState::of(BlockKind::Torch));
        assert_eq!(memory.surface(id, 3, 3), BlockPos::new(3, 65, 3));

        memory.set_block(id, BlockPos::new(3, 65, 3), BlockState::of(BlockKind::Dirt));
        assert_eq!(memory.surface(id, 3, 3), BlockPos::new(3, 66, 3));
    }

    #[test]
    fn loaded_area_is_bounded() {
        let (memory, id) = world();
        assert!(memory.is_area_loaded(id, BlockPos::new(30, 64, 0), 2));
        assert!(!memory.is_area_loaded(id, BlockPos::new(31, 64, 0), 2));
        assert!(!memory.is_area_loaded(WorldId::new(), BlockPos::new(0, 64, 0), 0));
    }

    #[test]
    fn chest_slots_are_created_lazily() {
        let (memory, id) = world();
        let pos = BlockPos::new(1, 65, 1);
        assert_eq!(memory.container_size(id, pos), None);

        memory.set_block(id, pos, BlockState::of(BlockKind::Chest));
        assert_eq!(memory.container_size(id, pos), Some(CHEST_SLOTS));
        memory.set_container_slot(id, pos, 4, ItemStack::new(minefriend_domain::ItemKind::Bread, 2));
        assert_eq!(memory.container(id, pos).iter().flatten().count(), 1);
    }

    #[test]
    fn companion_follows_in_early_phases_only() {
        let (memory, id) = world();
        let owner = memory.add_player("Steve", id, Vec3::new(4.0, 65.0, 0.0));
        let appearance = CompanionAppearance {
            name: "Ivy".into(),
            skin_index: 0,
        };
        let companion = memory
            .spawn(owner, id, Vec3::new(0.0, 65.0, 0.0), &appearance)
            .expect("spawned");

        memory.notify_phase(companion, Phase::One);
        memory.advance_tick();
        let moved = memory.position(companion).expect("position");
        assert!(moved.x > 0.0);

        memory.notify_phase(companion, Phase::Three);
        memory.advance_tick();
        assert_eq!(memory.position(companion), Some(moved));
    }

    #[test]
    fn speech_cooldown_runs_down() {
        let (memory, id) = world();
        let owner = memory.add_player("Steve", id, Vec3::default());
        let appearance = CompanionAppearance {
            name: "Ivy".into(),
            skin_index: 0,
        };
        let companion = memory
            .spawn(owner, id, Vec3::default(), &appearance)
            .expect("spawned");
        memory.set_speech_cooldown(companion, 2);
        assert!(!memory.can_speak(companion));
        memory.advance_tick();
        memory.advance_tick();
        assert!(memory.can_speak(companion));
    }
}
