//! Friend profile and companion record persistence.

use std::sync::Arc;

use minefriend_domain::{ActorId, CompanionRecord, FriendProfile, PlayerId};

use crate::infrastructure::ports::{RepoError, SaveRecordPort};

/// Blob key on the player's save record.
pub const PROFILE_KEY: &str = "MineFriend";
/// Blob key on the companion actor's save record.
pub const COMPANION_RECORD_KEY: &str = "MineFriendCompanion";

pub struct ProfileRepository {
    records: Arc<dyn SaveRecordPort>,
}

impl ProfileRepository {
    pub fn new(records: Arc<dyn SaveRecordPort>) -> Self {
        Self { records }
    }

    pub fn load(&self, player: PlayerId) -> Result<Option<FriendProfile>, RepoError> {
        self.records
            .load_player_blob(player, PROFILE_KEY)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(RepoError::serialization)
    }

    pub fn save(&self, profile: &FriendProfile) -> Result<(), RepoError> {
        let blob = serde_json::to_value(profile).map_err(RepoError::serialization)?;
        self.records
            .store_player_blob(profile.owner(), PROFILE_KEY, blob)
    }

    pub fn load_companion_record(
        &self,
        companion: ActorId,
    ) -> Result<Option<CompanionRecord>, RepoError> {
        self.records
            .load_actor_blob(companion, COMPANION_RECORD_KEY)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(RepoError::serialization)
    }

    pub fn save_companion_record(
        &self,
        companion: ActorId,
        record: &CompanionRecord,
    ) -> Result<(), RepoError> {
        let blob = serde_json::to_value(record).map_err(RepoError::serialization)?;
        self.records
            .store_actor_blob(companion, COMPANION_RECORD_KEY, blob)
    }
}
