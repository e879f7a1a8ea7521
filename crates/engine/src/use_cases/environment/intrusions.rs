//! Phase three: someone has been in the player's home.

use minefriend_domain::{
    ActorCommand, ActorKind, ActorQuery, BlockKind, BlockPart, BlockPos, BlockState, Direction,
    DoorMaterial, DyeColor, EquipmentSlot, ItemKind, ItemStack, SoundEffect, Vec3,
};

use crate::infrastructure::random::{below, coin_flip, pick};

use super::context::ScareContext;
use super::terrain::{find_nearby_block, is_open_ground, random_surface};

const ECHO_ATTEMPTS: usize = 20;

const DAMAGED_ARMOR: [(EquipmentSlot, ItemKind); 4] = [
    (EquipmentSlot::Head, ItemKind::LeatherHelmet),
    (EquipmentSlot::Chest, ItemKind::LeatherChestplate),
    (EquipmentSlot::Legs, ItemKind::LeatherLeggings),
    (EquipmentSlot::Feet, ItemKind::LeatherBoots),
];

/// The next entry after `current` when a random draw landed on it.
fn different<T: Copy + PartialEq>(choices: &[T], drawn: T, current: T) -> T {
    if drawn != current {
        return drawn;
    }
    let index = choices.iter().position(|c| *c == drawn).unwrap_or(0);
    choices[(index + 1) % choices.len()]
}

impl ScareContext<'_> {
    /// Recolour both halves of a nearby bed.
    pub(super) fn replace_bed(&self) -> bool {
        let Some(pos) = find_nearby_block(
            self.world,
            self.random,
            self.world_id(),
            self.origin(),
            12,
            |state| matches!(state.kind, BlockKind::Bed(_)),
        ) else {
            return false;
        };
        let current = self.block(pos);
        let BlockKind::Bed(colour) = current.kind else {
            return false;
        };
        let Some(drawn) = pick(self.random, &DyeColor::ALL) else {
            return false;
        };
        let colour = different(&DyeColor::ALL, *drawn, colour);

        let towards_other = if current.part == BlockPart::Head {
            current.facing.opposite()
        } else {
            current.facing
        };
        let other = pos.relative(towards_other, 1);
        if !matches!(self.block(other).kind, BlockKind::Bed(_)) {
            return false;
        }
        let other_part = if current.part == BlockPart::Head {
            BlockPart::Foot
        } else {
            BlockPart::Head
        };

        let bed = BlockState::of(BlockKind::Bed(colour)).facing(current.facing);
        self.place(pos, bed.part(current.part));
        self.place(other, bed.part(other_part));
        true
    }

    pub(super) fn ruin_armor_stand(&self) -> bool {
        let stands = self.world.nearby_actors(
            self.world_id(),
            self.player.position,
            12.0,
            &ActorQuery::of(&[ActorKind::ArmorStand]),
        );
        let Some(stand) = pick(self.random, &stands) else {
            return false;
        };
        for (slot, item) in DAMAGED_ARMOR {
            let damage = below(self.random, item.max_damage().saturating_sub(1).max(1));
            self.world.command_actor(
                self.world_id(),
                stand.id,
                ActorCommand::Equip {
                    slot,
                    stack: ItemStack::damaged(item, damage),
                },
            );
        }
        true
    }

    /// Either take a nearby door away or swap its material.
    pub(super) fn tamper_door(&self) -> bool {
        let Some(pos) = find_nearby_block(
            self.world,
            self.random,
            self.world_id(),
            self.origin(),
            12,
            |state| matches!(state.kind, BlockKind::Door(_)),
        ) else {
            return false;
        };
        let current = self.block(pos);
        let BlockKind::Door(material) = current.kind else {
            return false;
        };
        let lower = if current.part == BlockPart::Lower {
            pos
        } else {
            pos.below()
        };
        let other = if current.part == BlockPart::Lower {
            pos.above()
        } else {
            pos.below()
        };
        if !matches!(self.block(other).kind, BlockKind::Door(_)) {
            return false;
        }

        if coin_flip(self.random) {
            self.clear(pos);
            self.clear(other);
            return true;
        }

        let Some(drawn) = pick(self.random, &DoorMaterial::REPLACEMENTS) else {
            return false;
        };
        let replacement = different(&DoorMaterial::REPLACEMENTS, *drawn, material);
        let door = BlockState {
            kind: BlockKind::Door(replacement),
            part: BlockPart::Lower,
            ..current
        };
        self.place(lower, door);
        self.place(lower.above(), door.part(BlockPart::Upper));
        true
    }

    pub(super) fn spoil_chest(&self) -> bool {
        let Some(pos) = find_nearby_block(
            self.world,
            self.random,
            self.world_id(),
            self.origin(),
            10,
            |state| state.kind == BlockKind::Chest,
        ) else {
            return false;
        };
        let Some(slots) = self.world.container_size(self.world_id(), pos) else {
            return false;
        };
        for slot in 0..slots {
            let count = 1 + below(self.random, 3);
            self.world.set_container_slot(
                self.world_id(),
                pos,
                slot,
                ItemStack::new(ItemKind::RottenFlesh, count),
            );
        }
        true
    }

    /// Sit one of the player's pets facing away, making it hiss or growl.
    pub(super) fn isolate_pet(&self) -> bool {
        let pets = self.world.nearby_actors(
            self.world_id(),
            self.player.position,
            12.0,
            &ActorQuery::of(&[ActorKind::Wolf, ActorKind::Cat]).owned_by(self.player.id),
        );
        let Some(pet) = pick(self.random, &pets) else {
            return false;
        };
        let dx = f64::from(self.random.gen_unit()) - 0.5;
        let dz = f64::from(self.random.gen_unit()) - 0.5;
        let yaw = dz.atan2(dx).to_degrees() as f32;
        let effect = if pet.kind == ActorKind::Cat {
            SoundEffect::CatHiss
        } else {
            SoundEffect::WolfGrowl
        };
        let cue = self.cue(effect, 0.8, 0.9, 0.2);

        self.world
            .command_actor(self.world_id(), pet.id, ActorCommand::Sit);
        self.world
            .command_actor(self.world_id(), pet.id, ActorCommand::Face { yaw });
        self.world
            .command_actor(self.world_id(), pet.id, ActorCommand::PlaySound { cue });
        true
    }

    /// A sign repeating what the player last said.
    pub(super) fn echo_chat_sign(&self) -> bool {
        let Some(line) = self.last_chat.filter(|l| !l.trim().is_empty()) else {
            return false;
        };
        for _ in 0..ECHO_ATTEMPTS {
            let pos = random_surface(self.world, self.random, self.world_id(), self.origin(), 10);
            if !is_open_ground(self.world, self.world_id(), pos) {
                continue;
            }
            self.place_sign(pos);
            self.world.set_sign_text(self.world_id(), pos, line, None);
            return true;
        }
        false
    }

    /// A crude copy of a home: cobblestone floor, plank walls, a window and a door.
    pub(super) fn mock_house(&self) -> bool {
        let base = random_surface(self.world, self.random, self.world_id(), self.origin(), 8);
        if !self.is_loaded(base, 4) {
            return false;
        }
        for x in -1..=1 {
            for z in -1..=1 {
                self.place(base.offset(x, -1, z), BlockState::of(BlockKind::Cobblestone));
            }
        }
        for y in 0..=2 {
            for x in -1..=1 {
                for z in -1..=1 {
                    self.place(base.offset(x, y, z), BlockState::of(house_cell(x, y, z)));
                }
            }
        }
        let door = BlockState::of(BlockKind::Door(DoorMaterial::Oak)).facing(Direction::South);
        let door_base = base.offset(0, 0, -1);
        self.place(door_base, door.part(BlockPart::Lower));
        self.place(door_base.above(), door.part(BlockPart::Upper));
        true
    }

    /// Something of the player's, displayed on a torch-lit plinth.
    pub(super) fn shrine(&self) -> bool {
        let Some(offering) = self.offering() else {
            return false;
        };
        let base = random_surface(self.world, self.random, self.world_id(), self.origin(), 8);
        if !self.is_loaded(base, 2) {
            return false;
        }
        self.place(base, BlockState::of(BlockKind::Cobblestone));
        for direction in Direction::HORIZONTAL {
            let support = base.relative(direction, 1).below();
            self.place(support, BlockState::of(BlockKind::Cobblestone));
            self.place(support.above(), BlockState::of(BlockKind::Torch));
        }
        self.world
            .spawn_item_display(self.world_id(), display_point(base), offering);
        true
    }

    /// A dropped item near the player, or else one from their inventory.
    fn offering(&self) -> Option<ItemStack> {
        let dropped: Vec<ItemStack> = self
            .world
            .nearby_actors(
                self.world_id(),
                self.player.position,
                12.0,
                &ActorQuery::of(&[ActorKind::DroppedItem]),
            )
            .into_iter()
            .filter_map(|actor| actor.item)
            .collect();
        if let Some(stack) = pick(self.random, &dropped) {
            return Some(*stack);
        }
        self.players
            .first_inventory_item(self.player.id)
            .map(ItemStack::single)
    }
}

/// What goes in each cell of the mock house, relative to its floor centre.
fn house_cell(x: i32, y: i32, z: i32) -> BlockKind {
    let wall = x.abs() == 1 || z.abs() == 1 || y == 2;
    if !wall {
        return BlockKind::Air;
    }
    match (x, y, z) {
        (0, 2, 0) => BlockKind::OakSlab,
        (0, 0..=1, -1) => BlockKind::Air,
        (1, 0, 1) => BlockKind::MossyCobblestone,
        _ => BlockKind::OakPlanks,
    }
}

fn display_point(base: BlockPos) -> Vec3 {
    Vec3::new(
        f64::from(base.x) + 0.5,
        f64::from(base.y) + 1.2,
        f64::from(base.z) + 0.5,
    )
}
