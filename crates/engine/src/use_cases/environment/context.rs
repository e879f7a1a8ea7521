use minefriend_domain::{BlockPos, BlockState, SoundCue, SoundEffect, WorldId};

use crate::infrastructure::ports::{PlayerPort, PlayerSnapshot, RandomPort, WorldPort};
use crate::infrastructure::random::jitter;

use super::actions::ScareAction;

/// Everything one action needs to inspect and change the player's surroundings.
pub struct ScareContext<'a> {
    pub world: &'a dyn WorldPort,
    pub players: &'a dyn PlayerPort,
    pub random: &'a dyn RandomPort,
    pub player: &'a PlayerSnapshot,
    /// The player's last chat line, for the echo sign.
    pub last_chat: Option<&'a str>,
}

impl ScareContext<'_> {
    /// Attempt one action. `false` means a precondition did not hold.
    pub fn perform(&self, action: ScareAction) -> bool {
        match action {
            ScareAction::ChestSound => self.chest_sound(),
            ScareAction::FootstepSound => self.footstep_sound(),
            ScareAction::PhantomHurtSound => self.phantom_hurt_sound(),
            ScareAction::CaveSound => self.cave_sound(),
            ScareAction::ExtinguishTorch => self.extinguish_torch(),
            ScareAction::PlantFlower => self.plant_flower(),
            ScareAction::DisturbFarm => self.disturb_farm(),
            ScareAction::FoundYouSign => self.found_you_sign(),
            ScareAction::DirtMarker => self.dirt_marker(),
            ScareAction::WatcherHole => self.watcher_hole(),
            ScareAction::ReplaceBed => self.replace_bed(),
            ScareAction::RuinArmorStand => self.ruin_armor_stand(),
            ScareAction::TamperDoor => self.tamper_door(),
            ScareAction::SpoilChest => self.spoil_chest(),
            ScareAction::IsolatePet => self.isolate_pet(),
            ScareAction::EchoChatSign => self.echo_chat_sign(),
            ScareAction::MockHouse => self.mock_house(),
            ScareAction::Shrine => self.shrine(),
            ScareAction::GolemsHostile => self.golems_hostile(),
            ScareAction::UpsetPets => self.upset_pets(),
            ScareAction::SpookVillagers => self.spook_villagers(),
            ScareAction::PanicPassiveMobs => self.panic_passive_mobs(),
        }
    }

    pub(super) fn world_id(&self) -> WorldId {
        self.player.world
    }

    pub(super) fn origin(&self) -> BlockPos {
        self.player.block()
    }

    pub(super) fn block(&self, pos: BlockPos) -> BlockState {
        self.world.block(self.world_id(), pos)
    }

    pub(super) fn place(&self, pos: BlockPos, state: BlockState) {
        self.world.set_block(self.world_id(), pos, state);
    }

    pub(super) fn clear(&self, pos: BlockPos) {
        self.place(pos, BlockState::AIR);
    }

    pub(super) fn is_loaded(&self, pos: BlockPos, radius: i32) -> bool {
        self.world.is_area_loaded(self.world_id(), pos, radius)
    }

    /// A cue whose pitch is `base` varied upward by up to `spread`.
    pub(super) fn cue(&self, effect: SoundEffect, volume: f32, base: f32, spread: f32) -> SoundCue {
        SoundCue::new(effect, volume, jitter(self.random, base, spread))
    }

    pub(super) fn sound_at(&self, pos: BlockPos, cue: SoundCue) {
        self.world.play_sound(self.world_id(), pos, cue);
    }
}
