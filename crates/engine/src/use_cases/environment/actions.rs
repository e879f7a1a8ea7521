//! The curated environmental actions and how a round orders them.

use minefriend_domain::Phase;

use crate::infrastructure::ports::RandomPort;
use crate::infrastructure::random::below;

/// Most actions tried in a single round.
pub const MAX_EVENT_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScareAction {
    // Phase two: something is watching.
    ChestSound,
    FootstepSound,
    PhantomHurtSound,
    CaveSound,
    ExtinguishTorch,
    PlantFlower,
    DisturbFarm,
    FoundYouSign,
    DirtMarker,
    WatcherHole,
    // Phase three: something is moving in.
    ReplaceBed,
    RuinArmorStand,
    TamperDoor,
    SpoilChest,
    IsolatePet,
    EchoChatSign,
    MockHouse,
    Shrine,
    // Phase four: the world turns.
    GolemsHostile,
    UpsetPets,
    SpookVillagers,
    PanicPassiveMobs,
}

const PHASE_TWO_ACTIONS: [ScareAction; 10] = [
    ScareAction::ChestSound,
    ScareAction::FootstepSound,
    ScareAction::PhantomHurtSound,
    ScareAction::CaveSound,
    ScareAction::ExtinguishTorch,
    ScareAction::PlantFlower,
    ScareAction::DisturbFarm,
    ScareAction::FoundYouSign,
    ScareAction::DirtMarker,
    ScareAction::WatcherHole,
];

const PHASE_THREE_ACTIONS: [ScareAction; 8] = [
    ScareAction::ReplaceBed,
    ScareAction::RuinArmorStand,
    ScareAction::TamperDoor,
    ScareAction::SpoilChest,
    ScareAction::IsolatePet,
    ScareAction::EchoChatSign,
    ScareAction::MockHouse,
    ScareAction::Shrine,
];

const PHASE_FOUR_ACTIONS: [ScareAction; 4] = [
    ScareAction::GolemsHostile,
    ScareAction::UpsetPets,
    ScareAction::SpookVillagers,
    ScareAction::PanicPassiveMobs,
];

impl ScareAction {
    /// Relative chance of being drawn early in a round.
    pub fn weight(self) -> u32 {
        match self {
            ScareAction::ChestSound
            | ScareAction::FootstepSound
            | ScareAction::PhantomHurtSound
            | ScareAction::CaveSound => 2,
            _ => 1,
        }
    }

    /// The action list for a phase. Dormant phases have none.
    pub fn for_phase(phase: Phase) -> &'static [ScareAction] {
        match phase {
            Phase::Two => &PHASE_TWO_ACTIONS,
            Phase::Three => &PHASE_THREE_ACTIONS,
            Phase::Four => &PHASE_FOUR_ACTIONS,
            Phase::None | Phase::One => &[],
        }
    }
}

/// Order `actions` by repeated weighted draws without replacement.
pub fn weighted_order(random: &dyn RandomPort, actions: &[ScareAction]) -> Vec<ScareAction> {
    let mut remaining = actions.to_vec();
    let mut ordered = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let total: u32 = remaining.iter().map(|a| a.weight()).sum();
        let mut roll = below(random, total);
        let index = remaining
            .iter()
            .position(|action| {
                if roll < action.weight() {
                    true
                } else {
                    roll -= action.weight();
                    false
                }
            })
            .unwrap_or(remaining.len() - 1);
        ordered.push(remaining.remove(index));
    }
    ordered
}
