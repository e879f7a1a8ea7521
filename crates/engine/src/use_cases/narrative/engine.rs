//! The tick-thread owner of every session.
//!
//! Game events and finished model replies arrive through one inbound queue.
//! [`NarrativeEngine::tick`] drains it, then runs the per-player pass:
//! message delivery, idle and ambient script lines, phase four behaviour and
//! the environmental clock.

use std::sync::Arc;

use minefriend_domain::{
    ActorId, CompanionRecord, FriendProfile, GameMode, LineStyle, Phase, PlayerId, RuleEffect,
    ScareState, SessionId, Vec3, WorldId, BUILT_IN_SKIN_COUNT, RANDOM_NAMES,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::infrastructure::config::NarrativeConfig;
use crate::infrastructure::ports::{CompanionPort, PlayerPort, PlayerSnapshot, RandomPort};
use crate::infrastructure::random::{below, coin_flip, pick};
use crate::repositories::ProfileRepository;
use crate::use_cases::dialogue::{
    DialogueGateway, Reply, ScriptedDialogue, ScriptedReply, ScriptedTurn, KICKOFF_MESSAGE,
};
use crate::use_cases::environment::EnvironmentalEventEngine;
use crate::use_cases::phase::{PhaseFour, PhaseTransitions};
use crate::use_cases::scheduler::MessageScheduler;
use crate::use_cases::session::{DialogueSession, SessionRegistry};

use super::dispatch::{ReplyDispatcher, ReplyRequest};
use super::events::{GameEvent, Inbound};

/// Told to a hardcore player when they respawn.
pub const HARDCORE_RESPAWN_MESSAGE: &str = "You can't come back.";

/// Prompt name when the player has no snapshot.
const UNKNOWN_PLAYER_NAME: &str = "Player";

/// Where a fresh companion appears, relative to its owner.
const SPAWN_OFFSET: Vec3 = Vec3::new(1.5, 0.0, 1.5);

/// Runtime switches taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub model_dialogue: bool,
    pub scripted_dialogue: bool,
    pub reply_delay_ticks: u32,
}

impl From<&NarrativeConfig> for EngineSettings {
    fn from(config: &NarrativeConfig) -> Self {
        Self {
            model_dialogue: config.model_dialogue,
            scripted_dialogue: config.scripted_dialogue,
            reply_delay_ticks: config.reply_delay_ticks,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&NarrativeConfig::default())
    }
}

/// Container for the collaborators the engine drives.
pub struct EngineServices {
    pub players: Arc<dyn PlayerPort>,
    pub companions: Arc<dyn CompanionPort>,
    pub random: Arc<dyn RandomPort>,
    pub repo: Arc<ProfileRepository>,
    pub gateway: DialogueGateway,
    pub scripted: Arc<ScriptedDialogue>,
    pub transitions: PhaseTransitions,
    pub phase_four: PhaseFour,
    pub scheduler: MessageScheduler,
    pub environment: EnvironmentalEventEngine,
}

impl EngineServices {
    fn new_profile(&self, player: PlayerId) -> FriendProfile {
        let random = self.random.as_ref();
        let name = pick(random, &RANDOM_NAMES).copied().unwrap_or("Friend");
        let skin = below(random, BUILT_IN_SKIN_COUNT.unsigned_abs()) as i32;
        tracing::info!(player_id = %player, name = %name, skin_index = skin, "Created friend profile");
        FriendProfile::new(player, name, skin)
    }

    fn load_profile(&self, player: PlayerId) -> Option<FriendProfile> {
        match self.repo.load(player) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, player_id = %player, "Failed to load friend profile");
                None
            }
        }
    }

    fn load_companion_record(&self, companion: ActorId) -> Option<CompanionRecord> {
        match self.repo.load_companion_record(companion) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, companion_id = %companion, "Failed to load companion record");
                None
            }
        }
    }

    /// Reuse the bound companion if it is still in the world, otherwise spawn one.
    fn place_companion(&self, session: &mut DialogueSession, player: &PlayerSnapshot) {
        let appearance = session.appearance();
        let companion = match session.resolve_companion(self.companions.as_ref()) {
            Some(existing) => {
                self.companions.apply_appearance(existing, &appearance);
                Some(existing)
            }
            None => {
                let at = Vec3::new(
                    player.position.x + SPAWN_OFFSET.x,
                    player.position.y + SPAWN_OFFSET.y,
                    player.position.z + SPAWN_OFFSET.z,
                );
                let spawned = self
                    .companions
                    .spawn(session.player, player.world, at, &appearance);
                match spawned {
                    Some(id) => {
                        session.profile.bind_companion(id);
                        tracing::debug!(player_id = %session.player, companion_id = %id, "Spawned companion");
                    }
                    None => {
                        tracing::warn!(player_id = %session.player, "Companion could not be spawned");
                    }
                }
                spawned
            }
        };
        if let Some(companion) = companion {
            self.companions.notify_phase(companion, session.phase());
        }
    }

    fn persona_for(&self, session: &DialogueSession) -> String {
        let name = session.companion_name().trim();
        if name.is_empty() {
            self.gateway.pick_persona()
        } else {
            name.to_string()
        }
    }

    fn reply_request(&self, session: &DialogueSession, player_name: &str, message: &str) -> ReplyRequest {
        ReplyRequest {
            player: session.player,
            session: session.id,
            persona: self.persona_for(session),
            player_name: player_name.to_string(),
            message: message.to_string(),
            phase: session.phase(),
        }
    }

    fn scripted_turn(&self, session: &DialogueSession, message: &str) -> ScriptedReply {
        let turn = ScriptedTurn {
            phase: session.phase(),
            message,
            companion_name: session.companion_name(),
            script_disabled: session.profile.is_script_disabled(),
            history: &session.history,
            mimic_newest: coin_flip(self.random.as_ref()),
        };
        self.scripted.respond(&turn)
    }

    /// The line after "what's your name" becomes the companion's name.
    fn take_new_name(&self, settings: &EngineSettings, session: &mut DialogueSession, line: &str) {
        session.awaiting_name = false;
        let name = match session.profile.rename(line) {
            Ok(name) => name.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, player_id = %session.player, "Rejected companion name");
                return;
            }
        };
        session.save(&self.repo);
        if let Some(companion) = session.resolve_companion(self.companions.as_ref()) {
            self.companions
                .apply_appearance(companion, &session.appearance());
        }
        if settings.scripted_dialogue {
            session.enqueue(self.scripted.renamed(&name));
        }
        tracing::info!(player_id = %session.player, name = %name, "Companion renamed");
    }

    fn tick_session(
        &self,
        settings: &EngineSettings,
        session: &mut DialogueSession,
        scare: &mut ScareState,
        player: &PlayerSnapshot,
    ) {
        self.scheduler.drain(session);
        session.idle_ticks += 1;
        if settings.scripted_dialogue {
            self.idle_prompt(session);
            self.ambient_line(session);
        }
        self.phase_four.tick(session, player);
        self.environment.tick(player, session.phase(), scare);
    }

    /// Nudge a silent player during the introduction, then wait out a grace period.
    fn idle_prompt(&self, session: &mut DialogueSession) {
        if session.phase() != Phase::One
            || session.idle_ticks != i64::from(self.scripted.idle_after_ticks())
        {
            return;
        }
        let lines = self.scripted.idle_lines(session.companion_name());
        session.enqueue(lines);
        session.idle_ticks = -i64::from(self.scripted.idle_grace_ticks());
    }

    fn ambient_line(&self, session: &mut DialogueSession) {
        let phase = session.phase();
        if self.scripted.ambient(phase).is_none() {
            return;
        }
        let Some(companion) = session.resolve_companion(self.companions.as_ref()) else {
            return;
        };
        if !self.companions.can_speak(companion) {
            return;
        }
        if let Some(line) =
            self.scripted
                .roll_ambient(phase, session.companion_name(), self.random.as_ref())
        {
            session.enqueue([line]);
        }
    }
}

/// Routes events to sessions and runs the simulation-side work once per tick.
///
/// Everything here runs on the tick thread. Model requests run on spawned
/// tasks and come back through the same inbound queue as game events, so
/// dispatching a request needs a tokio runtime.
pub struct NarrativeEngine {
    services: EngineServices,
    settings: EngineSettings,
    registry: SessionRegistry,
    dispatcher: ReplyDispatcher,
    inbound: UnboundedReceiver<Inbound>,
    sender: UnboundedSender<Inbound>,
}

impl NarrativeEngine {
    pub fn new(services: EngineServices, settings: EngineSettings) -> Self {
        let (sender, inbound) = mpsc::unbounded_channel();
        let dispatcher = ReplyDispatcher::new(services.gateway.clone(), sender.clone());
        Self {
            services,
            settings,
            registry: SessionRegistry::new(),
            dispatcher,
            inbound,
            sender,
        }
    }

    /// A handle for posting events from other threads.
    pub fn sender(&self) -> UnboundedSender<Inbound> {
        self.sender.clone()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn session(&self, player: PlayerId) -> Option<&DialogueSession> {
        self.registry.lookup(player)
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Model requests for `player` still running.
    pub fn in_flight(&self, player: PlayerId) -> usize {
        self.dispatcher.in_flight(player)
    }

    /// One simulation tick: the inbound queue first, then every online session.
    ///
    /// Players whose session was retired by a world unload keep their
    /// environmental clock running until they chat, leave or get a new session.
    pub fn tick(&mut self) {
        while let Ok(inbound) = self.inbound.try_recv() {
            self.handle(inbound);
        }

        for player in self.registry.players() {
            let Some(snapshot) = self.services.players.snapshot(player) else {
                continue;
            };
            if let Some((session, scare)) = self.registry.session_and_scare_mut(player) {
                self.services
                    .tick_session(&self.settings, session, scare, &snapshot);
            }
        }

        for (player, phase) in self.registry.detached_players() {
            let Some(snapshot) = self.services.players.snapshot(player) else {
                continue;
            };
            let scare = self.registry.scare_state_mut(player);
            self.services.environment.tick(&snapshot, phase, scare);
        }
    }

    pub fn handle(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Event(event) => self.handle_event(event),
            Inbound::Completion {
                player,
                session,
                reply,
            } => self.complete(player, session, reply),
        }
    }

    pub fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::PlayerJoined { player } => self.player_joined(player),
            GameEvent::PlayerLeft { player } => self.player_left(player),
            GameEvent::Chat { player, message } => self.chat(player, &message),
            GameEvent::CompanionAttacked {
                attacker,
                companion,
            } => self.companion_attacked(attacker, companion),
            GameEvent::PlayerRespawned { player } => self.player_respawned(player),
            GameEvent::WorldUnloaded { world } => self.world_unloaded(world),
            GameEvent::CompanionLoaded { companion, owner } => {
                self.companion_loaded(companion, owner)
            }
        }
    }

    fn player_joined(&mut self, player: PlayerId) {
        let Some(snapshot) = self.services.players.snapshot(player) else {
            tracing::debug!(player_id = %player, "Joined player is not online");
            return;
        };
        let (profile, returning) = match self.services.load_profile(player) {
            Some(profile) => (profile, true),
            None => (self.services.new_profile(player), false),
        };

        let mut session = DialogueSession::new(player, snapshot.world, profile);
        if let Some(pending) = self.registry.take_pending_advance(player) {
            self.services.transitions.apply_pending(&mut session, pending);
        }
        self.services.place_companion(&mut session, &snapshot);
        session.save(&self.services.repo);

        if self.settings.scripted_dialogue {
            let name = session.companion_name().to_string();
            let lines = if returning {
                self.services.scripted.return_greeting(session.phase(), &name)
            } else {
                self.services.scripted.initial_greeting(&name)
            };
            session.enqueue(lines);
        }
        let kickoff = self
            .settings
            .model_dialogue
            .then(|| {
                self.services
                    .reply_request(&session, &snapshot.name, KICKOFF_MESSAGE)
            });

        tracing::info!(
            player_id = %player,
            session_id = %session.id,
            companion = %session.companion_name(),
            phase = %session.phase(),
            returning,
            "Player joined"
        );
        self.registry.insert(session);
        if let Some(request) = kickoff {
            self.dispatcher.dispatch(request);
        }
    }

    fn player_left(&mut self, player: PlayerId) {
        let phase = match self.registry.remove(player) {
            Some(session) => {
                session.save(&self.services.repo);
                Some(session.phase())
            }
            None => self.services.load_profile(player).map(|p| p.phase()),
        };
        self.registry.forget_player(player);

        let Some(phase) = phase else {
            tracing::debug!(player_id = %player, "Player without a companion left");
            return;
        };
        let pending = self.services.transitions.disconnect_advance(phase);
        if let Some(next) = pending {
            self.registry.record_pending_advance(player, next);
        }
        tracing::info!(player_id = %player, phase = %phase, pending = ?pending, "Player left");
    }

    /// Open a session outside the join flow, folding in any pending advance.
    fn open_session(&mut self, player: PlayerId, world: WorldId, profile: FriendProfile) {
        let mut session = DialogueSession::new(player, world, profile);
        if let Some(pending) = self.registry.take_pending_advance(player) {
            self.services.transitions.apply_pending(&mut session, pending);
        }
        session.resolve_companion(self.services.companions.as_ref());
        session.save(&self.services.repo);
        tracing::debug!(player_id = %player, session_id = %session.id, "Opened dialogue session");
        self.registry.insert(session);
    }

    /// Reopen a session from the stored profile when the player has none.
    ///
    /// Returns `false` for players who are offline or never had a companion.
    fn ensure_session(&mut self, player: PlayerId) -> bool {
        if self.registry.lookup(player).is_some() {
            return true;
        }
        let world = self.services.players.snapshot(player).map(|s| s.world);
        match (world, self.services.load_profile(player)) {
            (Some(world), Some(profile)) => {
                self.open_session(player, world, profile);
                true
            }
            _ => false,
        }
    }

    fn chat(&mut self, player: PlayerId, message: &str) {
        if !self.ensure_session(player) {
            tracing::debug!(player_id = %player, "Chat from a player without a companion");
            return;
        }
        self.registry.scare_state_mut(player).record_chat(message);

        let Self {
            services,
            settings,
            registry,
            dispatcher,
            ..
        } = self;
        let Some(session) = registry.lookup_mut(player) else {
            return;
        };
        session.idle_ticks = 0;
        session.history.record(message);

        if session.awaiting_name && !message.trim().is_empty() {
            services.take_new_name(settings, session, message);
            return;
        }

        let mut effect = RuleEffect::None;
        if settings.scripted_dialogue {
            let reply = services.scripted_turn(session, message);
            session.enqueue(reply.lines);
            effect = reply.effect;
        }

        services.transitions.record_rejection(session, message);

        match effect {
            RuleEffect::AwaitName => session.awaiting_name = true,
            RuleEffect::EndIntroduction => {
                if session.profile.disable_script() {
                    session.save(&services.repo);
                }
            }
            RuleEffect::None => {}
        }

        if settings.model_dialogue {
            let player_name = services
                .players
                .snapshot(player)
                .map(|s| s.name)
                .unwrap_or_else(|| UNKNOWN_PLAYER_NAME.to_string());
            dispatcher.dispatch(services.reply_request(session, &player_name, message));
        }
    }

    fn companion_attacked(&mut self, attacker: PlayerId, companion: ActorId) {
        if !self.ensure_session(attacker) {
            tracing::debug!(player_id = %attacker, "Attack from a player without a companion");
            return;
        }
        let Self {
            services, registry, ..
        } = self;
        let Some(session) = registry.lookup_mut(attacker) else {
            return;
        };
        if session.resolve_companion(services.companions.as_ref()) != Some(companion) {
            tracing::debug!(
                player_id = %attacker,
                companion_id = %companion,
                "Attacked actor is not this player's companion"
            );
            return;
        }
        services.transitions.hostile_act(session);
    }

    fn player_respawned(&mut self, player: PlayerId) {
        let hardcore = match self.registry.lookup(player) {
            Some(session) => session.profile.is_hardcore(),
            None => self
                .services
                .load_profile(player)
                .is_some_and(|p| p.is_hardcore()),
        };
        if !hardcore {
            return;
        }
        self.services
            .players
            .set_game_mode(player, GameMode::Spectator);
        self.services
            .players
            .send_system_message(player, HARDCORE_RESPAWN_MESSAGE);
        tracing::info!(player_id = %player, "Hardcore player respawned as spectator");
    }

    fn world_unloaded(&mut self, world: WorldId) {
        let retired = self.registry.retire_world(world);
        for session in &retired {
            session.save(&self.services.repo);
        }
        tracing::info!(world_id = %world, sessions = retired.len(), "World unloaded");
    }

    /// A companion actor appeared; rebind it, or rebuild a lost profile from it.
    fn companion_loaded(&mut self, companion: ActorId, owner: PlayerId) {
        if let Some(session) = self.registry.lookup_mut(owner) {
            if session.profile.bind_companion(companion) {
                session.save(&self.services.repo);
                tracing::debug!(player_id = %owner, companion_id = %companion, "Rebound loaded companion");
            }
            return;
        }

        let Some(snapshot) = self.services.players.snapshot(owner) else {
            tracing::debug!(player_id = %owner, companion_id = %companion, "Companion owner is offline");
            return;
        };
        let profile = match self.services.load_profile(owner) {
            Some(mut profile) => {
                profile.bind_companion(companion);
                profile
            }
            None => match self.services.load_companion_record(companion) {
                Some(record) => {
                    tracing::info!(
                        player_id = %owner,
                        companion_id = %companion,
                        phase = %record.phase,
                        "Restored friend profile from companion record"
                    );
                    record.restore_profile(owner, companion)
                }
                None => {
                    tracing::debug!(companion_id = %companion, "Loaded companion has no record");
                    return;
                }
            },
        };
        self.open_session(owner, snapshot.world, profile);
    }

    fn complete(&mut self, player: PlayerId, session_id: SessionId, reply: Reply) {
        if !self.registry.is_current(player, session_id) {
            tracing::debug!(
                player_id = %player,
                session_id = %session_id,
                "Dropping reply for a retired session"
            );
            return;
        }
        let Some(session) = self.registry.lookup_mut(player) else {
            return;
        };
        tracing::debug!(
            player_id = %player,
            persona = %reply.persona,
            fallback = reply.fallback,
            suggested = ?reply.suggested_phase,
            "Companion reply arrived"
        );
        if !reply.is_empty() {
            session
                .queue
                .schedule_after(reply.text, LineStyle::Plain, self.settings.reply_delay_ticks);
        }
        self.services
            .transitions
            .apply_suggestion(session, reply.suggested_phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, AppPorts};
    use crate::infrastructure::memory::{MemorySaveRecords, MemoryWorld, RecordingChat};
    use crate::infrastructure::ports::{CompletionPort, MockCompletionPort};
    use crate::infrastructure::random::FixedRandom;
    use crate::infrastructure::script_book::built_in_script_book;

    struct Fixture {
        world: Arc<MemoryWorld>,
        chat: Arc<RecordingChat>,
        records: Arc<MemorySaveRecords>,
        player: PlayerId,
        world_id: WorldId,
        engine: NarrativeEngine,
    }

    impl Fixture {
        fn tick(&mut self, ticks: usize) {
            for _ in 0..ticks {
                self.engine.tick();
            }
        }

        fn session(&self) -> &DialogueSession {
            self.engine.session(self.player).expect("session")
        }

        fn repo(&self) -> ProfileRepository {
            ProfileRepository::new(self.records.clone())
        }
    }

    fn fixture_with(settings: EngineSettings, completion: Arc<dyn CompletionPort>) -> Fixture {
        let world = Arc::new(MemoryWorld::new());
        let world_id = world.add_flat_world(16);
        let player = world.add_player("Steve", world_id, Vec3::new(0.5, 65.0, 0.5));
        let chat = Arc::new(RecordingChat::new());
        let records = Arc::new(MemorySaveRecords::new());
        let ports = AppPorts {
            world: world.clone(),
            players: world.clone(),
            companions: world.clone(),
            chat: chat.clone(),
            records: records.clone(),
            completion,
            random: Arc::new(FixedRandom(0)),
        };
        let book = built_in_script_book().expect("book");
        let app = App::new(ports, settings, std::time::Duration::from_secs(60), book);
        Fixture {
            world,
            chat,
            records,
            player,
            world_id,
            engine: app.engine,
        }
    }

    fn scripted_only() -> EngineSettings {
        EngineSettings {
            model_dialogue: false,
            scripted_dialogue: true,
            reply_delay_ticks: 20,
        }
    }

    fn silent() -> EngineSettings {
        EngineSettings {
            model_dialogue: false,
            scripted_dialogue: false,
            reply_delay_ticks: 20,
        }
    }

    fn no_calls() -> Arc<dyn CompletionPort> {
        let mut completion = MockCompletionPort::new();
        completion.expect_complete().never();
        Arc::new(completion)
    }

    fn joined(settings: EngineSettings) -> Fixture {
        let mut fx = fixture_with(settings, no_calls());
        let player = fx.player;
        fx.engine.handle_event(GameEvent::PlayerJoined { player });
        fx
    }

    fn say(fx: &mut Fixture, message: &str) {
        let player = fx.player;
        fx.engine.handle_event(GameEvent::Chat {
            player,
            message: message.to_string(),
        });
    }

    #[test]
    fn first_join_creates_profile_and_companion() {
        let fx = joined(scripted_only());

        let profile = fx.repo().load(fx.player).expect("load").expect("saved");
        assert_eq!(profile.name(), "Eli");
        assert_eq!(profile.phase(), Phase::One);
        let companion = profile.companion().expect("bound");
        let state = fx.world.companion(companion).expect("spawned");
        assert_eq!(state.owner, fx.player);
        assert_eq!(state.phase, Phase::One);
        assert_eq!(state.appearance.name, "Eli");
        assert_eq!(fx.session().queue.len(), 5);
    }

    #[test]
    fn greeting_is_delivered_through_the_scheduler() {
        let mut fx = joined(scripted_only());
        fx.tick(40);
        assert_eq!(fx.chat.texts(), vec!["Hello!".to_string()]);
        assert_eq!(fx.chat.lines()[0].render(), "<Eli> Hello!");
    }

    #[test]
    fn returning_player_gets_the_phase_greeting_and_existing_companion() {
        let mut fx = joined(scripted_only());
        let companion = fx.session().profile.companion().expect("bound");
        let player = fx.player;

        fx.engine.handle_event(GameEvent::PlayerLeft { player });
        assert!(fx.engine.session(player).is_none());
        fx.engine.handle_event(GameEvent::PlayerJoined { player });

        assert_eq!(fx.session().phase(), Phase::Two);
        assert_eq!(fx.session().profile.companion(), Some(companion));
        assert_eq!(fx.world.companion_count(), 1);
        assert_eq!(fx.world.companion(companion).map(|c| c.phase), Some(Phase::Two));
        let texts: Vec<String> = fx.session().queue.iter().map(|m| m.text().to_string()).collect();
        assert_eq!(texts[0], "You came back!");
    }

    #[test]
    fn rename_consumes_the_next_line() {
        let mut fx = joined(scripted_only());
        fx.tick(400);
        say(&mut fx, "what is your name?");
        assert!(fx.session().awaiting_name);

        say(&mut fx, "  Biscuit ");
        let session = fx.session();
        assert!(!session.awaiting_name);
        assert_eq!(session.companion_name(), "Biscuit");
        assert_eq!(session.profile.negatives(), 0);
        let companion = session.profile.companion().expect("bound");
        assert_eq!(
            fx.world.companion(companion).map(|c| c.appearance.name),
            Some("Biscuit".to_string())
        );
        let stored = fx.repo().load(fx.player).expect("load").expect("saved");
        assert_eq!(stored.name(), "Biscuit");
    }

    #[test]
    fn acceptance_ends_the_introduction() {
        let mut fx = joined(scripted_only());
        say(&mut fx, "yeah sure");
        assert!(fx.session().profile.is_script_disabled());
        assert_eq!(fx.session().phase(), Phase::One);
        let stored = fx.repo().load(fx.player).expect("load").expect("saved");
        assert!(stored.is_script_disabled());
    }

    #[test]
    fn rejections_count_without_scripted_dialogue() {
        let mut fx = joined(silent());
        say(&mut fx, "no");
        assert_eq!(fx.session().profile.negatives(), 1);
        say(&mut fx, "go away");
        assert_eq!(fx.session().phase(), Phase::Two);
        assert!(fx.session().profile.companion().is_none());
        assert_eq!(fx.world.companion_count(), 0);
        assert!(fx.chat.lines().is_empty());
    }

    #[test]
    fn idle_prompt_fires_once_then_waits() {
        let mut fx = joined(scripted_only());
        fx.tick(1200);
        assert_eq!(fx.session().idle_ticks, -600);
        let queued: Vec<String> = fx.session().queue.iter().map(|m| m.text().to_string()).collect();
        assert_eq!(queued.first().map(String::as_str), Some("?"));

        fx.tick(1);
        assert_eq!(fx.session().idle_ticks, -599);
    }

    #[test]
    fn chat_resets_the_idle_counter() {
        let mut fx = joined(silent());
        fx.tick(30);
        assert_eq!(fx.session().idle_ticks, 30);
        say(&mut fx, "hi");
        assert_eq!(fx.session().idle_ticks, 0);
        assert_eq!(fx.session().history.newest(), Some("hi"));
    }

    #[test]
    fn attacking_someone_elses_actor_changes_nothing() {
        let mut fx = joined(silent());
        let player = fx.player;
        fx.engine.handle_event(GameEvent::CompanionAttacked {
            attacker: player,
            companion: ActorId::new(),
        });
        assert_eq!(fx.session().phase(), Phase::One);
        assert!(fx.session().profile.companion().is_some());
    }

    #[test]
    fn hardcore_respawn_turns_the_player_into_a_spectator() {
        let mut fx = joined(silent());
        let player = fx.player;
        fx.engine.handle_event(GameEvent::PlayerLeft { player });
        let mut profile = fx.repo().load(player).expect("load").expect("saved");
        profile.enable_hardcore();
        fx.repo().save(&profile).expect("save");

        fx.engine.handle_event(GameEvent::PlayerRespawned { player });

        let snapshot = fx.world.player(player).expect("player");
        assert_eq!(snapshot.game_mode, GameMode::Spectator);
        assert_eq!(
            fx.world.system_messages(player),
            vec![HARDCORE_RESPAWN_MESSAGE.to_string()]
        );
    }

    #[test]
    fn ordinary_respawn_is_left_alone() {
        let mut fx = joined(silent());
        let player = fx.player;
        fx.engine.handle_event(GameEvent::PlayerRespawned { player });
        assert_eq!(
            fx.world.player(player).map(|p| p.game_mode),
            Some(GameMode::Survival)
        );
        assert!(fx.world.system_messages(player).is_empty());
    }

    #[test]
    fn world_unload_retires_and_saves_sessions() {
        let mut fx = joined(silent());
        let player = fx.player;
        say(&mut fx, "no");
        let world = fx.world_id;
        fx.engine.handle_event(GameEvent::WorldUnloaded { world });

        assert!(fx.engine.session(player).is_none());
        let stored = fx.repo().load(player).expect("load").expect("saved");
        assert_eq!(stored.negatives(), 1);
    }

    #[test]
    fn loaded_companion_restores_a_lost_profile() {
        let mut fx = fixture_with(silent(), no_calls());
        let owner = fx.player;
        let companion = ActorId::new();
        let mut remembered = FriendProfile::new(owner, "Mira", 2);
        remembered.enter_phase(Phase::Three);
        fx.repo()
            .save_companion_record(companion, &CompanionRecord::from_profile(&remembered))
            .expect("record");

        fx.engine
            .handle_event(GameEvent::CompanionLoaded { companion, owner });

        let session = fx.session();
        assert_eq!(session.companion_name(), "Mira");
        assert_eq!(session.phase(), Phase::Three);
        let stored = fx.repo().load(owner).expect("load").expect("saved");
        assert_eq!(stored.phase(), Phase::Three);
        assert_eq!(stored.skin_index(), 2);
        assert_eq!(stored.negatives(), 0);
    }

    #[test]
    fn loaded_companion_without_owner_online_is_ignored() {
        let mut fx = fixture_with(silent(), no_calls());
        let owner = fx.player;
        fx.world.set_online(owner, false);
        fx.engine.handle_event(GameEvent::CompanionLoaded {
            companion: ActorId::new(),
            owner,
        });
        assert!(fx.engine.session(owner).is_none());
        assert!(fx.repo().load(owner).expect("load").is_none());
    }

    #[test]
    fn chat_without_a_profile_is_ignored() {
        let mut fx = fixture_with(silent(), no_calls());
        say(&mut fx, "hello?");
        assert!(fx.engine.session(fx.player).is_none());
    }

    #[test]
    fn chat_reopens_a_retired_session() {
        let mut fx = joined(silent());
        let world = fx.world_id;
        fx.engine.handle_event(GameEvent::WorldUnloaded { world });
        say(&mut fx, "hello again");
        assert_eq!(fx.session().history.newest(), Some("hello again"));
        assert!(fx.session().profile.companion().is_some());
    }

    #[test]
    fn attack_after_a_world_unload_still_turns_the_companion() {
        let mut fx = joined(silent());
        let player = fx.player;
        let companion = fx.session().profile.companion().expect("bound");
        let world = fx.world_id;
        fx.engine.handle_event(GameEvent::WorldUnloaded { world });

        fx.engine.handle_event(GameEvent::CompanionAttacked {
            attacker: player,
            companion,
        });

        assert_eq!(fx.session().phase(), Phase::Two);
        assert_eq!(fx.world.companion_count(), 0);
        let stored = fx.repo().load(player).expect("load").expect("saved");
        assert_eq!(stored.phase(), Phase::Two);
        assert_eq!(stored.companion(), None);
    }

    #[test]
    fn environmental_events_continue_after_a_world_unload() {
        let mut fx = joined(silent());
        say(&mut fx, "no");
        say(&mut fx, "go away");
        assert_eq!(fx.session().phase(), Phase::Two);
        let world = fx.world_id;
        fx.engine.handle_event(GameEvent::WorldUnloaded { world });
        assert!(fx.engine.session(fx.player).is_none());

        let before = fx.world.sounds().len();
        fx.tick(1000);
        assert!(fx.world.sounds().len() > before);

        let player = fx.player;
        fx.engine.handle_event(GameEvent::PlayerLeft { player });
        assert!(fx.engine.registry().detached_players().is_empty());
    }

    #[test]
    fn posted_events_are_handled_on_the_next_tick() {
        let mut fx = fixture_with(silent(), no_calls());
        let player = fx.player;
        fx.engine
            .sender()
            .send(GameEvent::PlayerJoined { player }.into())
            .expect("send");
        assert!(fx.engine.session(player).is_none());
        fx.tick(1);
        assert!(fx.engine.session(player).is_some());
    }

    #[test]
    fn completion_is_queued_after_the_reply_delay() {
        let mut fx = joined(silent());
        let player = fx.player;
        let session = fx.session().id;
        fx.engine.handle(Inbound::Completion {
            player,
            session,
            reply: Reply {
                persona: "Eli".into(),
                text: "Hi there!".into(),
                suggested_phase: Some(Phase::Two),
                fallback: false,
            },
        });
        assert_eq!(fx.session().phase(), Phase::Two);
        fx.tick(19);
        assert!(fx.chat.texts().is_empty());
        fx.tick(1);
        assert_eq!(fx.chat.texts(), vec!["Hi there!".to_string()]);
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut fx = joined(silent());
        let player = fx.player;
        fx.engine.handle(Inbound::Completion {
            player,
            session: SessionId::new(),
            reply: Reply {
                persona: "Eli".into(),
                text: "too late".into(),
                suggested_phase: Some(Phase::Two),
                fallback: false,
            },
        });
        assert_eq!(fx.session().phase(), Phase::One);
        assert!(fx.session().queue.is_empty());
    }

    #[tokio::test]
    async fn join_sends_a_kickoff_request() {
        let mut completion = MockCompletionPort::new();
        completion
            .expect_complete()
            .times(1)
            .returning(|_| Ok(r#"{"response": "Oh, hi!"}"#.to_string()));
        let settings = EngineSettings {
            model_dialogue: true,
            scripted_dialogue: false,
            reply_delay_ticks: 1,
        };
        let mut fx = fixture_with(settings, Arc::new(completion));
        let player = fx.player;
        fx.engine.handle_event(GameEvent::PlayerJoined { player });
        assert_eq!(fx.engine.in_flight(player), 1);

        for _ in 0..50 {
            tokio::task::yield_now().await;
            fx.tick(1);
            if !fx.chat.texts().is_empty() {
                break;
            }
        }
        assert_eq!(fx.chat.texts(), vec!["Oh, hi!".to_string()]);
        assert_eq!(fx.engine.in_flight(player), 0);
    }
}
