//! Every way a companion's phase can change.

use std::sync::Arc;

use minefriend_domain::{accepts_suggestion, next_phase, Phase};

use crate::infrastructure::ports::CompanionPort;
use crate::repositories::ProfileRepository;
use crate::use_cases::dialogue::ScriptedDialogue;
use crate::use_cases::session::DialogueSession;

/// Why a phase change happened, for the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    /// Applied on reconnect after the player disconnected.
    Reconnect,
    /// The model's reply carried a directive.
    Suggestion,
    HostileAct,
    RepeatedRejection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionOutcome {
    /// Not phase one, or the line was not a rejection.
    Ignored,
    Counted(u32),
    /// Too many rejections; the companion turned.
    Escalated,
}

/// More rejections than this in phase one turn the companion.
pub const REJECTION_LIMIT: u32 = 1;

pub struct PhaseTransitions {
    repo: Arc<ProfileRepository>,
    companions: Arc<dyn CompanionPort>,
    scripted: Arc<ScriptedDialogue>,
    scripted_enabled: bool,
}

impl PhaseTransitions {
    pub fn new(
        repo: Arc<ProfileRepository>,
        companions: Arc<dyn CompanionPort>,
        scripted: Arc<ScriptedDialogue>,
        scripted_enabled: bool,
    ) -> Self {
        Self {
            repo,
            companions,
            scripted,
            scripted_enabled,
        }
    }

    /// Move the session's companion to `to`. Returns `false` if it was already there.
    pub fn advance(
        &self,
        session: &mut DialogueSession,
        to: Phase,
        reason: TransitionReason,
    ) -> bool {
        let Some(from) = session.profile.enter_phase(to) else {
            return false;
        };
        if to == Phase::Four {
            session.phase_four_initialized = false;
        }
        session.save(&self.repo);

        if let Some(companion) = session.resolve_companion(self.companions.as_ref()) {
            self.companions.notify_phase(companion, to);
            if to == Phase::Four {
                self.companions
                    .apply_appearance(companion, &session.appearance());
            }
        }

        if self.scripted_enabled {
            session.enqueue([self.scripted.phase_change_narration()]);
        }

        tracing::info!(
            player_id = %session.player,
            from = %from,
            to = %to,
            reason = ?reason,
            "Companion phase changed"
        );
        true
    }

    /// Apply a model-suggested phase if the transition rules allow it.
    pub fn apply_suggestion(&self, session: &mut DialogueSession, suggested: Option<Phase>) -> bool {
        let Some(suggested) = suggested else {
            return false;
        };
        let current = session.phase();
        if !accepts_suggestion(current, suggested) {
            tracing::debug!(
                player_id = %session.player,
                current = %current,
                suggested = %suggested,
                "Ignoring phase suggestion"
            );
            return false;
        }
        self.advance(session, suggested, TransitionReason::Suggestion)
    }

    /// The player attacked the companion: straight to phase two, companion gone.
    pub fn hostile_act(&self, session: &mut DialogueSession) {
        if self.scripted_enabled {
            let lines = self.scripted.attack_reaction(session.companion_name());
            session.enqueue(lines);
        }
        self.advance(session, Phase::Two, TransitionReason::HostileAct);
        self.forget_companion(session);
    }

    /// Count a phase one rejection, turning the companion once the limit is passed.
    pub fn record_rejection(&self, session: &mut DialogueSession, message: &str) -> RejectionOutcome {
        if session.phase() != Phase::One || !self.scripted.is_rejection(message) {
            return RejectionOutcome::Ignored;
        }
        let count = session.profile.record_rejection();
        tracing::debug!(player_id = %session.player, negatives = count, "Rejection counted");
        if count <= REJECTION_LIMIT {
            session.save(&self.repo);
            return RejectionOutcome::Counted(count);
        }

        if self.scripted_enabled {
            let lines = self.scripted.escalation(session.companion_name());
            session.enqueue(lines);
        }
        self.advance(session, Phase::Two, TransitionReason::RepeatedRejection);
        self.forget_companion(session);
        RejectionOutcome::Escalated
    }

    /// The phase a disconnecting player should come back to, if it differs.
    pub fn disconnect_advance(&self, current: Phase) -> Option<Phase> {
        let next = next_phase(current);
        (next != current).then_some(next)
    }

    /// Fold a pending reconnect advance into a session that is still being set up.
    ///
    /// No narration, save or companion notification; the join flow does those
    /// once the companion is in place.
    pub fn apply_pending(&self, session: &mut DialogueSession, pending: Phase) -> bool {
        let Some(from) = session.profile.enter_phase(pending) else {
            return false;
        };
        if pending == Phase::Four {
            session.phase_four_initialized = false;
        }
        tracing::info!(
            player_id = %session.player,
            from = %from,
            to = %pending,
            reason = ?TransitionReason::Reconnect,
            "Companion phase changed"
        );
        true
    }

    fn forget_companion(&self, session: &mut DialogueSession) {
        if let Some(companion) = session.resolve_companion(self.companions.as_ref()) {
            self.companions.despawn(companion);
            tracing::debug!(player_id = %session.player, companion_id = %companion, "Companion despawned");
        }
        session.profile.clear_companion();
        session.save(&self.repo);
    }
}
