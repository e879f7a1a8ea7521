//! Line-oriented control surface for the console binary.
//!
//! Plain lines are chat. Slash commands drive the other game events.

use std::sync::Arc;

use minefriend_domain::PlayerId;

use crate::infrastructure::ports::CompanionPort;

use super::handle::{EngineHandle, HandleError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Chat(String),
    /// Hit the player's companion.
    Attack,
    /// Disconnect and join again.
    Rejoin,
    Respawn,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("Unknown command: /{0}")]
    UnknownCommand(String),
    #[error("There is no companion to attack")]
    NoCompanion,
    #[error(transparent)]
    Handle(#[from] HandleError),
}

impl ConsoleCommand {
    /// Parse one stdin line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ConsoleError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(command) = line.strip_prefix('/') else {
            return Ok(Some(Self::Chat(line.to_string())));
        };
        let command = command.trim().to_lowercase();
        match command.as_str() {
            "attack" => Ok(Some(Self::Attack)),
            "rejoin" => Ok(Some(Self::Rejoin)),
            "respawn" => Ok(Some(Self::Respawn)),
            "quit" | "exit" => Ok(Some(Self::Quit)),
            _ => Err(ConsoleError::UnknownCommand(command)),
        }
    }
}

/// The one local player the console speaks for.
pub struct ConsoleSession {
    player: PlayerId,
    handle: EngineHandle,
    companions: Arc<dyn CompanionPort>,
}

impl ConsoleSession {
    pub fn new(player: PlayerId, handle: EngineHandle, companions: Arc<dyn CompanionPort>) -> Self {
        Self {
            player,
            handle,
            companions,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Turn a command into engine events. `Quit` only leaves.
    pub fn apply(&self, command: ConsoleCommand) -> Result<(), ConsoleError> {
        match command {
            ConsoleCommand::Chat(message) => self.handle.chat(self.player, message)?,
            ConsoleCommand::Attack => {
                let companion = self
                    .companions
                    .find_owned_by(self.player)
                    .ok_or(ConsoleError::NoCompanion)?;
                self.handle.attack(self.player, companion)?;
            }
            ConsoleCommand::Rejoin => {
                self.handle.leave(self.player)?;
                self.handle.join(self.player)?;
            }
            ConsoleCommand::Respawn => self.handle.respawn(self.player)?,
            ConsoleCommand::Quit => self.handle.leave(self.player)?,
        }
        tracing::debug!(player_id = %self.player, "Console command posted");
        Ok(())
    }
}
