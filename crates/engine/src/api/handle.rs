//! Posting events to the tick thread from anywhere.

use minefriend_domain::{ActorId, PlayerId, WorldId};
use tokio::sync::mpsc::UnboundedSender;

use crate::use_cases::narrative::{GameEvent, Inbound};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    #[error("Narrative engine has stopped")]
    EngineStopped,
}

/// Cloneable sender side of the engine's inbound queue.
///
/// Events are queued, not handled; the engine picks them up on its next tick.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: UnboundedSender<Inbound>,
}

impl EngineHandle {
    pub fn new(sender: UnboundedSender<Inbound>) -> Self {
        Self { sender }
    }

    pub fn post(&self, event: GameEvent) -> Result<(), HandleError> {
        self.sender
            .send(Inbound::Event(event))
            .map_err(|_| HandleError::EngineStopped)
    }

    pub fn join(&self, player: PlayerId) -> Result<(), HandleError> {
        self.post(GameEvent::PlayerJoined { player })
    }

    pub fn leave(&self, player: PlayerId) -> Result<(), HandleError> {
        self.post(GameEvent::PlayerLeft { player })
    }

    pub fn chat(&self, player: PlayerId, message: impl Into<String>) -> Result<(), HandleError> {
        self.post(GameEvent::Chat {
            player,
            message: message.into(),
        })
    }

    pub fn attack(&self, attacker: PlayerId, companion: ActorId) -> Result<(), HandleError> {
        self.post(GameEvent::CompanionAttacked {
            attacker,
            companion,
        })
    }

    pub fn respawn(&self, player: PlayerId) -> Result<(), HandleError> {
        self.post(GameEvent::PlayerRespawned { player })
    }

    pub fn unload_world(&self, world: WorldId) -> Result<(), HandleError> {
        self.post(GameEvent::WorldUnloaded { world })
    }

    pub fn companion_loaded(&self, companion: ActorId, owner: PlayerId) -> Result<(), HandleError> {
        self.post(GameEvent::CompanionLoaded { companion, owner })
    }
}
