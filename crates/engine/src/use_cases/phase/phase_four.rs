//! The companion's final phase: a one-time setup, then it hunts the player.

use std::sync::Arc;

use minefriend_domain::{BlockPos, GameMode, Phase, WorldId};

use crate::infrastructure::ports::{CompanionPort, PlayerPort, PlayerSnapshot, RandomPort, WorldPort};
use crate::infrastructure::random::offset;
use crate::repositories::ProfileRepository;
use crate::use_cases::session::DialogueSession;

pub const ASSAULT_COOLDOWN_TICKS: u32 = 40;
pub const ASSAULT_DAMAGE: f32 = 6.0;
/// Squared reach of the companion's attack.
pub const ASSAULT_RANGE_SQ: f64 = 9.0;
pub const CHASE_SPEED: f64 = 1.4;

const POCKET_ATTEMPTS: usize = 40;
const POCKET_SPREAD: i32 = 32;
/// The column scan starts this far under the surface.
const POCKET_SURFACE_DEPTH: i32 = 5;
/// ...and stops this far above the bottom of the world.
const POCKET_FLOOR_MARGIN: i32 = 10;

pub struct PhaseFour {
    world: Arc<dyn WorldPort>,
    players: Arc<dyn PlayerPort>,
    companions: Arc<dyn CompanionPort>,
    random: Arc<dyn RandomPort>,
    repo: Arc<ProfileRepository>,
}

impl PhaseFour {
    pub fn new(
        world: Arc<dyn WorldPort>,
        players: Arc<dyn PlayerPort>,
        companions: Arc<dyn CompanionPort>,
        random: Arc<dyn RandomPort>,
        repo: Arc<ProfileRepository>,
    ) -> Self {
        Self {
            world,
            players,
            companions,
            random,
            repo,
        }
    }

    /// Per-tick phase four behaviour. Does nothing in other phases.
    pub fn tick(&self, session: &mut DialogueSession, player: &PlayerSnapshot) {
        if session.phase() != Phase::Four {
            return;
        }
        self.prepare(session, player);
        self.aggression(session, player);
    }

    /// Skin enforcement every tick, plus the one-shot setup for this session.
    pub fn prepare(&self, session: &mut DialogueSession, player: &PlayerSnapshot) {
        if session.profile.use_owner_skin() {
            if let Some(companion) = session.resolve_companion(self.companions.as_ref()) {
                self.companions
                    .apply_appearance(companion, &session.appearance());
            }
            session.save(&self.repo);
        }

        if session.phase_four_initialized {
            return;
        }

        match self.find_cave_pocket(player.world, player.block()) {
            Some(pocket) => {
                self.players.teleport(player.id, pocket.bottom_center());
                tracing::info!(player_id = %player.id, ?pocket, "Player taken underground");
            }
            None => tracing::debug!(player_id = %player.id, "No cave pocket found"),
        }
        if player.game_mode == GameMode::Creative {
            self.players.set_game_mode(player.id, GameMode::Survival);
        }
        if session.profile.enable_hardcore() {
            session.save(&self.repo);
        }
        session.phase_four_initialized = true;
        session.assault_cooldown = ASSAULT_COOLDOWN_TICKS;
    }

    /// An enclosed air pocket under a random nearby column.
    ///
    /// The cell and the one above it are air and the floor below is not.
    pub fn find_cave_pocket(&self, world: WorldId, origin: BlockPos) -> Option<BlockPos> {
        let floor = self.world.min_build_height(world) + POCKET_FLOOR_MARGIN;
        for _ in 0..POCKET_ATTEMPTS {
            let x = origin.x + offset(self.random.as_ref(), POCKET_SPREAD);
            let z = origin.z + offset(self.random.as_ref(), POCKET_SPREAD);
            let surface = self.world.surface(world, x, z);
            let mut y = surface.y - POCKET_SURFACE_DEPTH;
            while y > floor {
                let pos = BlockPos::new(x, y, z);
                if self.world.block(world, pos).is_air()
                    && self.world.block(world, pos.above()).is_air()
                    && !self.world.block(world, pos.below()).is_air()
                {
                    return Some(pos);
                }
                y -= 1;
            }
        }
        None
    }

    /// Chase and hit the player unless they are spectating.
    pub fn aggression(&self, session: &mut DialogueSession, player: &PlayerSnapshot) {
        if player.game_mode == GameMode::Spectator {
            return;
        }
        if player.game_mode == GameMode::Creative {
            self.players.set_game_mode(player.id, GameMode::Survival);
        }

        if let Some(companion) = session.resolve_companion(self.companions.as_ref()) {
            self.companions
                .navigate_to(companion, player.position, CHASE_SPEED);
            self.companions.look_at(companion, player.position);

            let in_reach = self
                .companions
                .position(companion)
                .is_some_and(|at| at.distance_sq(&player.position) <= ASSAULT_RANGE_SQ);
            if in_reach && session.assault_cooldown == 0 {
                self.players.hurt(player.id, companion, ASSAULT_DAMAGE);
                session.assault_cooldown = ASSAULT_COOLDOWN_TICKS;
                tracing::debug!(player_id = %player.id, "Companion struck the player");
            }
        }

        session.assault_cooldown = session.assault_cooldown.saturating_sub(1);
    }
}
