//! Per-player cooldown clock for environmental events.

use crate::phase::Phase;

pub const INITIAL_SCARE_COOLDOWN: u32 = 200;

/// Half-open tick range `[min, max)` a cooldown is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownWindow {
    pub min: u32,
    pub max: u32,
}

impl CooldownWindow {
    pub const PHASE_CHANGE: CooldownWindow = CooldownWindow { min: 100, max: 300 };
    pub const AFTER_SUCCESS: CooldownWindow = CooldownWindow { min: 400, max: 800 };
    pub const AFTER_FAILURE: CooldownWindow = CooldownWindow { min: 120, max: 280 };

    pub fn span(&self) -> u32 {
        self.max.saturating_sub(self.min).max(1)
    }

    /// Pick a value with `roll`, which must return something in `0..bound`.
    pub fn sample(&self, roll: &mut impl FnMut(u32) -> u32) -> u32 {
        self.min + roll(self.span()) % self.span()
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..self.max).contains(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownTick {
    /// The current phase has no environmental events.
    Dormant,
    CoolingDown { remaining: u32 },
    /// Run a round of events now.
    Due,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScareState {
    last_phase: Phase,
    cooldown: u32,
    last_chat: Option<String>,
}

impl ScareState {
    pub fn new() -> Self {
        Self {
            last_phase: Phase::None,
            cooldown: INITIAL_SCARE_COOLDOWN,
            last_chat: None,
        }
    }

    pub fn last_phase(&self) -> Phase {
        self.last_phase
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn last_chat(&self) -> Option<&str> {
        self.last_chat.as_deref()
    }

    pub fn record_chat(&mut self, line: &str) {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            self.last_chat = Some(trimmed.to_string());
        }
    }

    /// Advance the clock by one tick for a player currently in `phase`.
    ///
    /// A phase change re-arms the cooldown before anything else happens.
    pub fn tick(&mut self, phase: Phase, roll: &mut impl FnMut(u32) -> u32) -> CooldownTick {
        if phase != self.last_phase {
            self.last_phase = phase;
            self.cooldown = CooldownWindow::PHASE_CHANGE.sample(roll);
        }
        if phase.is_dormant() {
            return CooldownTick::Dormant;
        }
        self.cooldown = self.cooldown.saturating_sub(1);
        if self.cooldown > 0 {
            CooldownTick::CoolingDown {
                remaining: self.cooldown,
            }
        } else {
            CooldownTick::Due
        }
    }

    /// Re-arm after a round, longer if something actually happened.
    pub fn complete_round(&mut self, succeeded: bool, roll: &mut impl FnMut(u32) -> u32) {
        let window = if succeeded {
            CooldownWindow::AFTER_SUCCESS
        } else {
            CooldownWindow::AFTER_FAILURE
        };
        self.cooldown = window.sample(roll);
    }
}

impl Default for ScareState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_roll() -> impl FnMut(u32) -> u32 {
        |_| 0
    }

    fn max_roll() -> impl FnMut(u32) -> u32 {
        |bound| bound - 1
    }

    #[test]
    fn dormant_phases_never_fire() {
        let mut state = ScareState::new();
        let mut roll = min_roll();
        for _ in 0..1_000 {
            assert_eq!(state.tick(Phase::One, &mut roll), CooldownTick::Dormant);
        }
    }

    #[test]
    fn phase_change_rearms_inside_window() {
        for mut roll in [
            Box::new(min_roll()) as Box<dyn FnMut(u32) -> u32>,
            Box::new(max_roll()),
        ] {
            let mut state = ScareState::new();
            state.tick(Phase::Two, &mut roll);
            // One tick has already been consumed.
            assert!(CooldownWindow::PHASE_CHANGE.contains(state.cooldown() + 1));
        }
    }

    #[test]
    fn fires_when_cooldown_runs_out() {
        let mut state = ScareState::new();
        let mut roll = min_roll();
        let mut ticks = 0;
        loop {
            ticks += 1;
            match state.tick(Phase::Three, &mut roll) {
                CooldownTick::Due => break,
                CooldownTick::CoolingDown { .. } => {}
                CooldownTick::Dormant => panic!("phase three is not dormant"),
            }
        }
        assert_eq!(ticks, CooldownWindow::PHASE_CHANGE.min);
    }

    #[test]
    fn round_outcome_picks_window() {
        let mut state = ScareState::new();
        state.complete_round(true, &mut max_roll());
        assert!(CooldownWindow::AFTER_SUCCESS.contains(state.cooldown()));
        assert_eq!(state.cooldown(), 799);

        state.complete_round(false, &mut min_roll());
        assert_eq!(state.cooldown(), 120);
        state.complete_round(false, &mut max_roll());
        assert_eq!(state.cooldown(), 279);
    }

    #[test]
    fn remembers_last_non_blank_chat() {
        let mut state = ScareState::new();
        state.record_chat("  where are you ");
        state.record_chat("   ");
        assert_eq!(state.last_chat(), Some("where are you"));
    }
}
