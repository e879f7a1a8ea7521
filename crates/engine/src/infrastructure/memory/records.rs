use dashmap::DashMap;
use minefriend_domain::{ActorId, PlayerId};
use serde_json::Value;

use crate::infrastructure::ports::{RepoError, SaveRecordPort};

/// Save records that live as long as the process.
#[derive(Default)]
pub struct MemorySaveRecords {
    players: DashMap<(PlayerId, String), Value>,
    actors: DashMap<(ActorId, String), Value>,
}

impl MemorySaveRecords {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveRecordPort for MemorySaveRecords {
    fn load_player_blob(&self, player: PlayerId, key: &str) -> Result<Option<Value>, RepoError> {
        Ok(self
            .players
            .get(&(player, key.to_string()))
            .map(|v| v.value().clone()))
    }

    fn store_player_blob(&self, player: PlayerId, key: &str, blob: Value) -> Result<(), RepoError> {
        self.players.insert((player, key.to_string()), blob);
        Ok(())
    }

    fn load_actor_blob(&self, actor: ActorId, key: &str) -> Result<Option<Value>, RepoError> {
        Ok(self
            .actors
            .get(&(actor, key.to_string()))
            .map(|v| v.value().clone()))
    }

    fn store_actor_blob(&self, actor: ActorId, key: &str, blob: Value) -> Result<(), RepoError> {
        self.actors.insert((actor, key.to_string()), blob);
        Ok(())
    }
}
