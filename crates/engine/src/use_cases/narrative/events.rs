use minefriend_domain::{ActorId, PlayerId, SessionId, WorldId};

use crate::use_cases::dialogue::Reply;

/// Something the simulation reports to the narrative engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerJoined { player: PlayerId },
    PlayerLeft { player: PlayerId },
    Chat { player: PlayerId, message: String },
    /// `attacker` hit the companion actor `companion`.
    CompanionAttacked { attacker: PlayerId, companion: ActorId },
    PlayerRespawned { player: PlayerId },
    WorldUnloaded { world: WorldId },
    /// A companion actor came into a loaded world, e.g. after a restart.
    CompanionLoaded { companion: ActorId, owner: PlayerId },
}

/// Everything that reaches the tick thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Event(GameEvent),
    /// A model reply for the session that asked for it.
    Completion {
        player: PlayerId,
        session: SessionId,
        reply: Reply,
    },
}

impl From<GameEvent> for Inbound {
    fn from(event: GameEvent) -> Self {
        Inbound::Event(event)
    }
}
