use serde::{Deserialize, Serialize};

use crate::entities::FriendProfile;
use crate::ids::{ActorId, PlayerId};
use crate::phase::Phase;

/// What the companion actor keeps in its own save record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<PlayerId>,
    #[serde(rename = "FriendName")]
    pub name: String,
    pub phase: Phase,
    pub skin_index: i32,
}

impl CompanionRecord {
    pub fn from_profile(profile: &FriendProfile) -> Self {
        Self {
            owner: Some(profile.owner()),
            name: profile.name().to_string(),
            phase: profile.phase(),
            skin_index: profile.skin_index(),
        }
    }

    /// Rebuild the owner's profile. Counters and flags start fresh.
    pub fn restore_profile(&self, owner: PlayerId, companion: ActorId) -> FriendProfile {
        FriendProfile::restored(owner, companion, &self.name, self.phase, self.skin_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_resets_counters() {
        let owner = PlayerId::new();
        let mut profile = FriendProfile::new(owner, "Kai", 0);
        profile.enter_phase(Phase::Two);
        profile.record_rejection();
        profile.disable_script();

        let record = CompanionRecord::from_profile(&profile);
        let companion = ActorId::new();
        let restored = record.restore_profile(owner, companion);

        assert_eq!(restored.name(), "Kai");
        assert_eq!(restored.phase(), Phase::Two);
        assert_eq!(restored.companion(), Some(companion));
        assert_eq!(restored.negatives(), 0);
        assert!(!restored.is_script_disabled());
    }
}
