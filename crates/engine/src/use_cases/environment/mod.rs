//! Environmental events: cooldown-driven world effects around a player.
//!
//! Each tick the player's [`ScareState`] clock runs down. When it expires a
//! round draws the phase's actions in weighted order and tries them until
//! one succeeds or the attempt budget runs out.

use std::sync::Arc;

use minefriend_domain::{CooldownTick, Phase, ScareState};

use crate::infrastructure::ports::{PlayerPort, PlayerSnapshot, RandomPort, WorldPort};
use crate::infrastructure::random::below;

mod actions;
mod context;
mod intrusions;
mod omens;
mod terrain;
mod uprising;

pub use actions::{weighted_order, ScareAction, MAX_EVENT_ATTEMPTS};
pub use context::ScareContext;
pub use terrain::find_nearby_block;

/// What one expired cooldown led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub phase: Phase,
    pub attempted: Vec<ScareAction>,
    pub performed: Option<ScareAction>,
}

pub struct EnvironmentalEventEngine {
    world: Arc<dyn WorldPort>,
    players: Arc<dyn PlayerPort>,
    random: Arc<dyn RandomPort>,
}

impl EnvironmentalEventEngine {
    pub fn new(
        world: Arc<dyn WorldPort>,
        players: Arc<dyn PlayerPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            world,
            players,
            random,
        }
    }

    /// Advance `state` one tick for `player`, running a round if it is due.
    pub fn tick(
        &self,
        player: &PlayerSnapshot,
        phase: Phase,
        state: &mut ScareState,
    ) -> Option<RoundReport> {
        let random = self.random.as_ref();
        let mut roll = |bound| below(random, bound);
        match state.tick(phase, &mut roll) {
            CooldownTick::Due => {}
            CooldownTick::Dormant | CooldownTick::CoolingDown { .. } => return None,
        }

        let report = self.run_round(player, phase, state.last_chat());
        state.complete_round(report.performed.is_some(), &mut roll);

        match report.performed {
            Some(action) => tracing::info!(
                player_id = %player.id,
                phase = %phase,
                action = ?action,
                attempts = report.attempted.len(),
                next_cooldown = state.cooldown(),
                "Environmental event performed"
            ),
            None => tracing::debug!(
                player_id = %player.id,
                phase = %phase,
                attempts = report.attempted.len(),
                next_cooldown = state.cooldown(),
                "No environmental event could run"
            ),
        }
        Some(report)
    }

    /// One round: weighted order, first success wins, bounded attempts.
    pub fn run_round(
        &self,
        player: &PlayerSnapshot,
        phase: Phase,
        last_chat: Option<&str>,
    ) -> RoundReport {
        let context = ScareContext {
            world: self.world.as_ref(),
            players: self.players.as_ref(),
            random: self.random.as_ref(),
            player,
            last_chat,
        };

        let mut report = RoundReport {
            phase,
            attempted: Vec::new(),
            performed: None,
        };
        let order = weighted_order(self.random.as_ref(), ScareAction::for_phase(phase));
        for action in order.into_iter().take(MAX_EVENT_ATTEMPTS) {
            report.attempted.push(action);
            if context.perform(action) {
                report.performed = Some(action);
                break;
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryWorld;
    use crate::infrastructure::random::{FixedRandom, SystemRandom};
    use minefriend_domain::{CooldownWindow, GameMode, PlayerId, Vec3, WorldId};

    fn engine_on(memory: Arc<MemoryWorld>, random: Arc<dyn RandomPort>) -> EnvironmentalEventEngine {
        EnvironmentalEventEngine::new(memory.clone(), memory, random)
    }

    fn snapshot(world: WorldId) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId::new(),
            name: "Steve".into(),
            world,
            position: Vec3::new(0.5, 65.0, 0.5),
            game_mode: GameMode::Survival,
        }
    }

    #[test]
    fn dormant_phase_never_runs_a_round() {
        let memory = Arc::new(MemoryWorld::new());
        let id = memory.add_flat_world(32);
        let engine = engine_on(memory.clone(), Arc::new(SystemRandom::new()));
        let player = snapshot(id);
        let mut state = ScareState::new();

        for _ in 0..1_000 {
            assert!(engine.tick(&player, Phase::One, &mut state).is_none());
        }
        assert!(memory.sounds().is_empty());
    }

    #[test]
    fn phase_two_always_finds_a_sound() {
        let memory = Arc::new(MemoryWorld::new());
        let id = memory.add_flat_world(32);
        let engine = engine_on(memory.clone(), Arc::new(SystemRandom::new()));
        let player = snapshot(id);

        for _ in 0..50 {
            let report = engine.run_round(&player, Phase::Two, None);
            assert!(report.performed.is_some());
            assert!(report.attempted.len() <= MAX_EVENT_ATTEMPTS);
        }
    }

    #[test]
    fn barren_round_gives_up_after_the_budget() {
        // Nothing in a flat empty world satisfies phase four.
        let memory = Arc::new(MemoryWorld::new());
        let id = memory.add_flat_world(32);
        let engine = engine_on(memory, Arc::new(SystemRandom::new()));

        let report = engine.run_round(&snapshot(id), Phase::Four, None);
        assert_eq!(report.performed, None);
        assert_eq!(report.attempted.len(), ScareAction::for_phase(Phase::Four).len());
    }

    #[test]
    fn phase_three_attempts_are_capped() {
        let memory = Arc::new(MemoryWorld::new());
        // Too small for the house or shrine to be loaded, and nothing to tamper with.
        let id = memory.add_flat_world(2);
        let engine = engine_on(memory, Arc::new(SystemRandom::new()));

        let report = engine.run_round(&snapshot(id), Phase::Three, None);
        assert_eq!(report.performed, None);
        assert_eq!(report.attempted.len(), MAX_EVENT_ATTEMPTS);
    }

    #[test]
    fn cooldown_rearms_from_the_round_outcome() {
        let memory = Arc::new(MemoryWorld::new());
        let id = memory.add_flat_world(32);
        let engine = engine_on(memory, Arc::new(FixedRandom(0)));
        let player = snapshot(id);
        let mut state = ScareState::new();

        let mut ticks = 0;
        let report = loop {
            ticks += 1;
            if let Some(report) = engine.tick(&player, Phase::Two, &mut state) {
                break report;
            }
            assert!(ticks < 1_000, "round never became due");
        };
        assert_eq!(ticks, CooldownWindow::PHASE_CHANGE.min);
        assert_eq!(report.performed, Some(ScareAction::ChestSound));
        assert_eq!(state.cooldown(), CooldownWindow::AFTER_SUCCESS.min);

        let report = loop {
            if let Some(report) = engine.tick(&player, Phase::Four, &mut state) {
                break report;
            }
        };
        assert_eq!(report.performed, None);
        assert_eq!(state.cooldown(), CooldownWindow::AFTER_FAILURE.min);
    }
}
