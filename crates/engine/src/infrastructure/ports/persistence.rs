//! Save record port.

use minefriend_domain::{ActorId, PlayerId};
use serde_json::Value;

use super::error::RepoError;

/// Keyed JSON blobs attached to player and actor save records.
#[cfg_attr(test, mockall::automock)]
pub trait SaveRecordPort: Send + Sync {
    fn load_player_blob(&self, player: PlayerId, key: &str) -> Result<Option<Value>, RepoError>;
    fn store_player_blob(&self, player: PlayerId, key: &str, blob: Value) -> Result<(), RepoError>;
    fn load_actor_blob(&self, actor: ActorId, key: &str) -> Result<Option<Value>, RepoError>;
    fn store_actor_blob(&self, actor: ActorId, key: &str, blob: Value) -> Result<(), RepoError>;
}
