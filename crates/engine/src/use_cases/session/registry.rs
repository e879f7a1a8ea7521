//! Lifecycle owner for dialogue sessions and per-player scare clocks.

use std::collections::HashMap;

use minefriend_domain::{Phase, PlayerId, ScareState, SessionId, WorldId};

use super::DialogueSession;

/// Maps players to their session, scare clock and pending phase advance.
///
/// Owned by the tick thread. Lookup, insert and remove are the only way
/// sessions change hands. A scare clock belongs to the player, not the
/// session: it outlives a world unload and is only dropped with
/// [`SessionRegistry::forget_player`].
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<PlayerId, DialogueSession>,
    scares: HashMap<PlayerId, ScareState>,
    pending_advances: HashMap<PlayerId, Phase>,
    /// Phase of players whose session was retired while they stayed online.
    detached: HashMap<PlayerId, Phase>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, player: PlayerId) -> Option<&DialogueSession> {
        self.sessions.get(&player)
    }

    pub fn lookup_mut(&mut self, player: PlayerId) -> Option<&mut DialogueSession> {
        self.sessions.get_mut(&player)
    }

    /// Register a session, returning the one it replaced.
    pub fn insert(&mut self, session: DialogueSession) -> Option<DialogueSession> {
        self.detached.remove(&session.player);
        let replaced = self.sessions.insert(session.player, session);
        if let Some(old) = &replaced {
            tracing::debug!(player_id = %old.player, session_id = %old.id, "Replaced dialogue session");
        }
        replaced
    }

    pub fn remove(&mut self, player: PlayerId) -> Option<DialogueSession> {
        self.sessions.remove(&player)
    }

    /// Whether `session` is still the live session for `player`.
    pub fn is_current(&self, player: PlayerId, session: SessionId) -> bool {
        self.sessions.get(&player).is_some_and(|s| s.id == session)
    }

    /// Remove every session living in `world`, keeping each player's phase
    /// for the environmental pass until a new session opens.
    pub fn retire_world(&mut self, world: WorldId) -> Vec<DialogueSession> {
        let players: Vec<PlayerId> = self
            .sessions
            .values()
            .filter(|s| s.world == world)
            .map(|s| s.player)
            .collect();
        let retired: Vec<DialogueSession> = players
            .into_iter()
            .filter_map(|player| self.sessions.remove(&player))
            .collect();
        for session in &retired {
            self.detached.insert(session.player, session.phase());
        }
        retired
    }

    /// Players without a session whose companion story is still running.
    pub fn detached_players(&self) -> Vec<(PlayerId, Phase)> {
        self.detached
            .iter()
            .map(|(player, phase)| (*player, *phase))
            .collect()
    }

    pub fn players(&self) -> Vec<PlayerId> {
        self.sessions.keys().copied().collect()
    }

    pub fn record_pending_advance(&mut self, player: PlayerId, phase: Phase) {
        self.pending_advances.insert(player, phase);
    }

    pub fn take_pending_advance(&mut self, player: PlayerId) -> Option<Phase> {
        self.pending_advances.remove(&player)
    }

    pub fn scare_state_mut(&mut self, player: PlayerId) -> &mut ScareState {
        self.scares.entry(player).or_default()
    }

    /// Drop everything kept for a player who left.
    pub fn forget_player(&mut self, player: PlayerId) -> Option<ScareState> {
        self.detached.remove(&player);
        self.scares.remove(&player)
    }

    /// The session and its scare clock together, for the per-tick pass.
    pub fn session_and_scare_mut(
        &mut self,
        player: PlayerId,
    ) -> Option<(&mut DialogueSession, &mut ScareState)> {
        let session = self.sessions.get_mut(&player)?;
        let scare = self.scares.entry(player).or_default();
        Some((session, scare))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minefriend_domain::FriendProfile;

    fn session_in(world: WorldId) -> DialogueSession {
        let player = PlayerId::new();
        DialogueSession::new(player, world, FriendProfile::new(player, "Kai", 1))
    }

    #[test]
    fn replaced_session_is_no_longer_current() {
        let mut registry = SessionRegistry::new();
        let world = WorldId::new();
        let first = session_in(world);
        let player = first.player;
        let first_id = first.id;
        registry.insert(first);

        let mut second = session_in(world);
        second.player = player;
        let second_id = second.id;
        assert!(registry.insert(second).is_some());

        assert!(!registry.is_current(player, first_id));
        assert!(registry.is_current(player, second_id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn retire_world_removes_only_that_world() {
        let mut registry = SessionRegistry::new();
        let unloading = WorldId::new();
        let staying = WorldId::new();
        registry.insert(session_in(unloading));
        registry.insert(session_in(unloading));
        let kept = session_in(staying);
        let kept_player = kept.player;
        registry.insert(kept);

        let retired = registry.retire_world(unloading);
        assert_eq!(retired.len(), 2);
        assert_eq!(registry.players(), vec![kept_player]);
        assert_eq!(registry.detached_players().len(), 2);
    }

    #[test]
    fn retired_players_keep_their_scare_clock_until_they_leave() {
        let mut registry = SessionRegistry::new();
        let world = WorldId::new();
        let mut session = session_in(world);
        session.profile.enter_phase(Phase::Two);
        let player = session.player;
        registry.insert(session);
        registry.scare_state_mut(player).record_chat("hello");

        registry.retire_world(world);
        assert_eq!(registry.detached_players(), vec![(player, Phase::Two)]);
        assert_eq!(registry.scare_state_mut(player).last_chat(), Some("hello"));

        // A fresh session takes the player back.
        let mut reopened = session_in(world);
        reopened.player = player;
        registry.insert(reopened);
        assert!(registry.detached_players().is_empty());

        registry.retire_world(world);
        assert!(registry.forget_player(player).is_some());
        assert!(registry.detached_players().is_empty());
    }

    #[test]
    fn pending_advance_is_taken_once() {
        let mut registry = SessionRegistry::new();
        let player = PlayerId::new();
        registry.record_pending_advance(player, Phase::Three);
        assert_eq!(registry.take_pending_advance(player), Some(Phase::Three));
        assert_eq!(registry.take_pending_advance(player), None);
    }

    #[test]
    fn scare_state_is_created_on_demand() {
        let mut registry = SessionRegistry::new();
        let session = session_in(WorldId::new());
        let player = session.player;
        registry.insert(session);

        registry.scare_state_mut(player).record_chat("hello");
        let (_, scare) = registry.session_and_scare_mut(player).expect("session");
        assert_eq!(scare.last_chat(), Some("hello"));

        assert!(registry.forget_player(player).is_some());
        assert!(registry.session_and_scare_mut(PlayerId::new()).is_none());
    }
}
