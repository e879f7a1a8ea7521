//! Narrative phases of the companion and the rules for moving between them.
//!
//! Phases are totally ordered by their integer id. The persisted form of a
//! phase is that id; ids that do not name a phase load as [`Phase::None`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Phase {
    #[default]
    None,
    One,
    Two,
    Three,
    Four,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::None,
        Phase::One,
        Phase::Two,
        Phase::Three,
        Phase::Four,
    ];

    pub fn id(self) -> u8 {
        match self {
            Phase::None => 0,
            Phase::One => 1,
            Phase::Two => 2,
            Phase::Three => 3,
            Phase::Four => 4,
        }
    }

    /// Resolve an id, falling back to `None` for anything unknown.
    pub fn from_id_or_none(id: i64) -> Phase {
        Phase::try_from(id).unwrap_or(Phase::None)
    }

    /// Phases in which the companion still takes phase hints from the model.
    pub fn is_early(self) -> bool {
        matches!(self, Phase::None | Phase::One | Phase::Two)
    }

    /// The environment stays quiet before the companion turns.
    pub fn is_dormant(self) -> bool {
        matches!(self, Phase::None | Phase::One)
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Four
    }

    /// The companion only follows its owner around while it is still friendly.
    pub fn companion_follows(self) -> bool {
        matches!(self, Phase::One | Phase::Two)
    }
}

impl TryFrom<i64> for Phase {
    type Error = DomainError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Phase::None),
            1 => Ok(Phase::One),
            2 => Ok(Phase::Two),
            3 => Ok(Phase::Three),
            4 => Ok(Phase::Four),
            other => Err(DomainError::parse(format!("Unknown phase id: {other}"))),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::None => "NONE",
            Phase::One => "PHASE_ONE",
            Phase::Two => "PHASE_TWO",
            Phase::Three => "PHASE_THREE",
            Phase::Four => "PHASE_FOUR",
        };
        f.write_str(name)
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = i64::deserialize(deserializer)?;
        Ok(Phase::from_id_or_none(id))
    }
}

/// The phase a player returns to after disconnecting. `Four` is terminal.
pub fn next_phase(phase: Phase) -> Phase {
    match phase {
        Phase::None => Phase::One,
        Phase::One => Phase::Two,
        Phase::Two => Phase::Three,
        Phase::Three | Phase::Four => Phase::Four,
    }
}

/// Whether a model-suggested phase may replace the current one.
///
/// Only early phases accept hints, the hint may not go past `Two`, may not
/// go backwards, and must actually change something.
pub fn accepts_suggestion(current: Phase, suggested: Phase) -> bool {
    current.is_early() && suggested <= Phase::Two && suggested > current
}
