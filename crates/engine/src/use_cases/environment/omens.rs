//! Phase two: small signs that something is watching.

use minefriend_domain::{
    BlockKind, BlockPos, BlockState, Direction, Flower, ItemKind, ItemStack, SoundEffect,
};

use crate::infrastructure::random::{below, offset, pick};

use super::context::ScareContext;
use super::terrain::{find_nearby_block, is_open_ground, random_surface};

const SURFACE_ATTEMPTS: usize = 20;
const FLOWER_ATTEMPTS: usize = 40;
const SIGN_MIN_DISTANCE: i32 = 12;
const SIGN_DISTANCE_SPREAD: u32 = 24;
const DIRT_MARKER_HEIGHT: i32 = 3;

pub(super) const FOUND_YOU_TEXT: &str = "Found you.";

impl ScareContext<'_> {
    pub(super) fn chest_sound(&self) -> bool {
        let pos = self.origin().offset(offset(self.random, 4), 0, offset(self.random, 4));
        self.sound_at(pos, self.cue(SoundEffect::ChestOpen, 0.6, 0.9, 0.2));
        self.sound_at(pos, self.cue(SoundEffect::ChestClose, 0.6, 0.9, 0.2));
        true
    }

    pub(super) fn footstep_sound(&self) -> bool {
        let pos = self.origin().offset(offset(self.random, 3), 0, offset(self.random, 3));
        self.sound_at(pos, self.cue(SoundEffect::WoodenTrapdoorClose, 0.6, 0.8, 0.4));
        true
    }

    pub(super) fn phantom_hurt_sound(&self) -> bool {
        self.sound_at(self.origin(), self.cue(SoundEffect::PlayerHurt, 0.8, 0.9, 0.2));
        true
    }

    pub(super) fn cave_sound(&self) -> bool {
        self.sound_at(self.origin(), self.cue(SoundEffect::CaveAmbient, 0.7, 0.8, 0.4));
        true
    }

    pub(super) fn extinguish_torch(&self) -> bool {
        let Some(pos) = find_nearby_block(
            self.world,
            self.random,
            self.world_id(),
            self.origin(),
            16,
            |state| state.kind.is_torch(),
        ) else {
            return false;
        };
        self.clear(pos);
        self.world
            .drop_item(self.world_id(), pos, ItemStack::new(ItemKind::Torch, 1));
        true
    }

    pub(super) fn plant_flower(&self) -> bool {
        for _ in 0..FLOWER_ATTEMPTS {
            let pos = random_surface(self.world, self.random, self.world_id(), self.origin(), 12);
            if !self.block(pos).is_air() || !self.block(pos.below()).kind.supports_flowers() {
                continue;
            }
            let Some(flower) = pick(self.random, &Flower::ALL) else {
                return false;
            };
            self.place(pos, BlockState::of(BlockKind::Flower(*flower)));
            return true;
        }
        false
    }

    pub(super) fn disturb_farm(&self) -> bool {
        let Some(soil) = find_nearby_block(
            self.world,
            self.random,
            self.world_id(),
            self.origin(),
            16,
            |state| state.kind == BlockKind::Farmland,
        ) else {
            return false;
        };
        let crop = soil.above();
        if self.block(crop).is_air() {
            return false;
        }
        self.clear(crop);
        true
    }

    pub(super) fn found_you_sign(&self) -> bool {
        for _ in 0..SURFACE_ATTEMPTS {
            let distance = SIGN_MIN_DISTANCE + below(self.random, SIGN_DISTANCE_SPREAD) as i32;
            let Some(direction) = pick(self.random, &Direction::HORIZONTAL) else {
                return false;
            };
            let base = self.origin().relative(*direction, distance);
            let pos = self.world.surface(self.world_id(), base.x, base.z);
            if !is_open_ground(self.world, self.world_id(), pos) {
                continue;
            }
            self.place_sign(pos);
            self.world.set_sign_text(
                self.world_id(),
                pos,
                FOUND_YOU_TEXT,
                Some(FOUND_YOU_TEXT.to_string()),
            );
            return true;
        }
        false
    }

    pub(super) fn dirt_marker(&self) -> bool {
        for _ in 0..SURFACE_ATTEMPTS {
            let pos = random_surface(self.world, self.random, self.world_id(), self.origin(), 16);
            if !self.is_loaded(pos, 1) || !is_open_ground(self.world, self.world_id(), pos) {
                continue;
            }
            for height in 0..DIRT_MARKER_HEIGHT {
                self.place(pos.offset(0, height, 0), BlockState::of(BlockKind::Dirt));
            }
            return true;
        }
        false
    }

    /// Two cells dug out of the ground, as if something had been standing there.
    pub(super) fn watcher_hole(&self) -> bool {
        for _ in 0..SURFACE_ATTEMPTS {
            let open = random_surface(self.world, self.random, self.world_id(), self.origin(), 16);
            if !self.is_loaded(open, 1) {
                continue;
            }
            let top = open.below();
            if !self.block(top).kind.is_solid() || !self.block(open).is_air() {
                continue;
            }
            self.clear(top);
            self.clear(top.below());
            return true;
        }
        false
    }

    pub(super) fn place_sign(&self, pos: BlockPos) {
        let rotation = below(self.random, 16) as u8;
        self.place(pos, BlockState::of(BlockKind::OakSign).rotation(rotation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{MemoryWorld, FLAT_GROUND_Y};
    use crate::infrastructure::ports::{MockWorldPort, PlayerSnapshot, WorldPort};
    use crate::infrastructure::random::{FixedRandom, SystemRandom};
    use minefriend_domain::{ActorKind, GameMode, PlayerId, Vec3, WorldId};

    fn snapshot(world: WorldId) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId::new(),
            name: "Steve".into(),
            world,
            position: Vec3::new(0.5, f64::from(FLAT_GROUND_Y + 1), 0.5),
            game_mode: GameMode::Survival,
        }
    }

    fn context<'a>(
        world: &'a dyn WorldPort,
        memory: &'a MemoryWorld,
        random: &'a dyn crate::infrastructure::ports::RandomPort,
        player: &'a PlayerSnapshot,
    ) -> ScareContext<'a> {
        ScareContext {
            world,
            players: memory,
            random,
            player,
            last_chat: None,
        }
    }

    #[test]
    fn chest_sound_plays_open_then_close() {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(32);
        let player = snapshot(id);
        let random = SystemRandom::new();

        assert!(context(&memory, &memory, &random, &player).chest_sound());
        let effects: Vec<_> = memory.sounds().iter().map(|c| c.effect).collect();
        assert_eq!(effects, vec![SoundEffect::ChestOpen, SoundEffect::ChestClose]);
        assert!(memory.sounds().iter().all(|c| (0.9..=1.1).contains(&c.pitch)));
    }

    #[test]
    fn torch_is_put_out_and_dropped() {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(32);
        let torch = BlockPos::new(3, 65, 2);
        memory.set_block(id, torch, BlockState::of(BlockKind::Torch));
        let player = snapshot(id);
        let random = SystemRandom::new();

        assert!(context(&memory, &memory, &random, &player).extinguish_torch());
        assert!(memory.block(id, torch).is_air());
        let drops = memory.actors_of(ActorKind::DroppedItem);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].item.map(|s| s.item), Some(ItemKind::Torch));
    }

    #[test]
    fn no_torch_means_no_effect() {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(32);
        let player = snapshot(id);
        let random = SystemRandom::new();

        assert!(!context(&memory, &memory, &random, &player).extinguish_torch());
        assert!(memory.actors_of(ActorKind::DroppedItem).is_empty());
    }

    #[test]
    fn flower_grows_on_grass() {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(32);
        let player = snapshot(id);
        let random = SystemRandom::new();

        assert!(context(&memory, &memory, &random, &player).plant_flower());
        let placed = memory.placed_blocks(id);
        assert_eq!(placed.len(), 1);
        assert!(matches!(placed[0].1.kind, BlockKind::Flower(_)));
        assert_eq!(placed[0].0.y, FLAT_GROUND_Y + 1);
    }

    #[test]
    fn farm_without_crop_is_left_alone() {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(32);
        let soil = BlockPos::new(2, 64, 2);
        memory.set_block(id, soil, BlockState::of(BlockKind::Farmland));
        let player = snapshot(id);
        let random = SystemRandom::new();
        let ctx = context(&memory, &memory, &random, &player);

        assert!(!ctx.disturb_farm());
        memory.set_block(id, soil.above(), BlockState::of(BlockKind::Crop));
        assert!(ctx.disturb_farm());
        assert!(memory.block(id, soil.above()).is_air());
    }

    #[test]
    fn found_you_sign_is_written_on_both_sides() {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(64);
        let player = snapshot(id);
        // distance 12, first direction (north)
        let random = FixedRandom(0);

        assert!(context(&memory, &memory, &random, &player).found_you_sign());
        let pos = BlockPos::new(0, 65, -12);
        assert_eq!(memory.block(id, pos).kind, BlockKind::OakSign);
        assert_eq!(
            memory.sign_text(id, pos),
            Some((FOUND_YOU_TEXT.to_string(), Some(FOUND_YOU_TEXT.to_string())))
        );
    }

    #[test]
    fn dirt_marker_is_three_tall() {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(32);
        let player = snapshot(id);
        let random = FixedRandom(0);

        assert!(context(&memory, &memory, &random, &player).dirt_marker());
        // a zero roll keeps the column under the player
        let base = BlockPos::new(0, 65, 0);
        for height in 0..3 {
            assert_eq!(memory.block(id, base.offset(0, height, 0)).kind, BlockKind::Dirt);
        }
    }

    #[test]
    fn watcher_hole_removes_two_cells() {
        let memory = MemoryWorld::new();
        let id = memory.add_flat_world(32);
        let player = snapshot(id);
        let random = FixedRandom(0);

        assert!(context(&memory, &memory, &random, &player).watcher_hole());
        assert!(memory.block(id, BlockPos::new(0, 64, 0)).is_air());
        assert!(memory.block(id, BlockPos::new(0, 63, 0)).is_air());
        assert_eq!(memory.block(id, BlockPos::new(0, 62, 0)).kind, BlockKind::Dirt);
    }

    #[test]
    fn surface_actions_give_up_in_unloaded_terrain() {
        let mut world = MockWorldPort::new();
        world.expect_surface().returning(|_, x, z| BlockPos::new(x, 65, z));
        world.expect_is_area_loaded().return_const(false);
        world.expect_set_block().never();
        let memory = MemoryWorld::new();
        let player = snapshot(WorldId::new());
        let random = SystemRandom::new();

        let ctx = context(&world, &memory, &random, &player);
        assert!(!ctx.dirt_marker());
        assert!(!ctx.watcher_hole());
    }
}
