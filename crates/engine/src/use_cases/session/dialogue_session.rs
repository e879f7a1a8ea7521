//! Per-player transient dialogue state.

use minefriend_domain::{
    ActorId, ChatHistory, CompanionRecord, FriendProfile, MessageQueue, Phase, PlayerId,
    SessionId, WorldId,
};

use crate::infrastructure::ports::{CompanionAppearance, CompanionPort};
use crate::repositories::ProfileRepository;
use crate::use_cases::dialogue::Utterance;

/// Everything the engine tracks for one connected player.
///
/// Only the tick thread touches a session. Async work refers to it by
/// `(player, id)` and is dropped if the id is no longer current.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    pub id: SessionId,
    pub player: PlayerId,
    pub world: WorldId,
    pub profile: FriendProfile,
    pub queue: MessageQueue,
    pub history: ChatHistory,
    /// Ticks since the player last spoke. Negative while the idle grace runs.
    pub idle_ticks: i64,
    /// The next non-blank line becomes the companion's name.
    pub awaiting_name: bool,
    pub phase_four_initialized: bool,
    pub assault_cooldown: u32,
}

impl DialogueSession {
    pub fn new(player: PlayerId, world: WorldId, profile: FriendProfile) -> Self {
        Self {
            id: SessionId::new(),
            player,
            world,
            profile,
            queue: MessageQueue::new(),
            history: ChatHistory::new(),
            idle_ticks: 0,
            awaiting_name: false,
            phase_four_initialized: false,
            assault_cooldown: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.profile.phase()
    }

    pub fn companion_name(&self) -> &str {
        self.profile.name()
    }

    pub fn appearance(&self) -> CompanionAppearance {
        CompanionAppearance {
            name: self.profile.name().to_string(),
            skin_index: self.profile.skin_index(),
        }
    }

    /// Queue scripted lines behind whatever is already waiting.
    pub fn enqueue(&mut self, lines: impl IntoIterator<Item = Utterance>) {
        for line in lines {
            self.queue.schedule_after(line.text, line.style, line.delay);
        }
    }

    /// The live companion actor, rebinding if the stored handle went stale.
    pub fn resolve_companion(&mut self, companions: &dyn CompanionPort) -> Option<ActorId> {
        if let Some(bound) = self.profile.companion() {
            if companions.is_present(bound) {
                return Some(bound);
            }
        }
        match companions.find_owned_by(self.player) {
            Some(found) => {
                if self.profile.bind_companion(found) {
                    tracing::debug!(
                        player_id = %self.player,
                        companion_id = %found,
                        "Rebound companion actor"
                    );
                }
                Some(found)
            }
            None => {
                self.profile.clear_companion();
                None
            }
        }
    }

    /// Persist the profile and, when bound, the companion's own record.
    ///
    /// Failures are logged and the in-memory state carries on.
    pub fn save(&self, repo: &ProfileRepository) {
        if let Err(e) = repo.save(&self.profile) {
            tracing::warn!(error = %e, player_id = %self.player, "Failed to save friend profile");
        }
        if let Some(companion) = self.profile.companion() {
            let record = CompanionRecord::from_profile(&self.profile);
            if let Err(e) = repo.save_companion_record(companion, &record) {
                tracing::warn!(
                    error = %e,
                    companion_id = %companion,
                    "Failed to save companion record"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemorySaveRecords;
    use crate::infrastructure::ports::MockCompanionPort;
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn session() -> DialogueSession {
        let player = PlayerId::new();
        DialogueSession::new(player, WorldId::new(), FriendProfile::new(player, "Ivy", 0))
    }

    #[test]
    fn live_binding_is_kept() {
        let mut session = session();
        let bound = ActorId::new();
        session.profile.bind_companion(bound);

        let mut companions = MockCompanionPort::new();
        companions
            .expect_is_present()
            .with(eq(bound))
            .return_const(true);
        companions.expect_find_owned_by().never();

        assert_eq!(session.resolve_companion(&companions), Some(bound));
    }

    #[test]
    fn stale_binding_is_re_resolved_by_owner() {
        let mut session = session();
        let stale = ActorId::new();
        let fresh = ActorId::new();
        session.profile.bind_companion(stale);
        let owner = session.player;

        let mut companions = MockCompanionPort::new();
        companions.expect_is_present().return_const(false);
        companions
            .expect_find_owned_by()
            .with(eq(owner))
            .return_const(Some(fresh));

        assert_eq!(session.resolve_companion(&companions), Some(fresh));
        assert_eq!(session.profile.companion(), Some(fresh));
    }

    #[test]
    fn missing_companion_clears_binding() {
        let mut session = session();
        session.profile.bind_companion(ActorId::new());

        let mut companions = MockCompanionPort::new();
        companions.expect_is_present().return_const(false);
        companions.expect_find_owned_by().return_const(None);

        assert_eq!(session.resolve_companion(&companions), None);
        assert!(session.profile.companion().is_none());
    }

    #[test]
    fn enqueued_lines_chain_their_delays() {
        let mut session = session();
        session.enqueue(vec![
            Utterance {
                text: "one".into(),
                style: minefriend_domain::LineStyle::Plain,
                delay: 2,
            },
            Utterance {
                text: "two".into(),
                style: minefriend_domain::LineStyle::Plain,
                delay: 1,
            },
        ]);
        assert!(session.queue.tick().is_empty());
        assert_eq!(session.queue.tick()[0].text(), "one");
        assert_eq!(session.queue.tick()[0].text(), "two");
    }

    #[test]
    fn save_writes_profile_and_companion_record() {
        let records = Arc::new(MemorySaveRecords::new());
        let repo = ProfileRepository::new(records.clone());
        let mut session = session();
        let companion = ActorId::new();
        session.profile.bind_companion(companion);
        session.profile.enter_phase(Phase::Two);

        session.save(&repo);

        let profile = repo.load(session.player).expect("load").expect("saved");
        assert_eq!(profile.phase(), Phase::Two);
        let record = repo
            .load_companion_record(companion)
            .expect("load")
            .expect("saved");
        assert_eq!(record.name, "Ivy");
        assert_eq!(record.owner, Some(session.player));
    }
}
