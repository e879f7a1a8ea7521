//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use minefriend_domain::ScriptBook;

use crate::api::EngineHandle;
use crate::infrastructure::config::NarrativeConfig;
use crate::infrastructure::ports::{
    ChatPort, CompanionPort, CompletionPort, PlayerPort, RandomPort, SaveRecordPort, WorldPort,
};
use crate::infrastructure::script_book::{load_script_book, ScriptBookError};
use crate::repositories::ProfileRepository;
use crate::use_cases::dialogue::{DialogueGateway, ScriptedDialogue};
use crate::use_cases::environment::EnvironmentalEventEngine;
use crate::use_cases::narrative::{EngineServices, EngineSettings, NarrativeEngine};
use crate::use_cases::phase::{PhaseFour, PhaseTransitions};
use crate::use_cases::scheduler::MessageScheduler;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Script book unavailable: {0}")]
    ScriptBook(#[from] ScriptBookError),
}

/// Every collaborator the engine consumes.
pub struct AppPorts {
    pub world: Arc<dyn WorldPort>,
    pub players: Arc<dyn PlayerPort>,
    pub companions: Arc<dyn CompanionPort>,
    pub chat: Arc<dyn ChatPort>,
    pub records: Arc<dyn SaveRecordPort>,
    pub completion: Arc<dyn CompletionPort>,
    pub random: Arc<dyn RandomPort>,
}

/// Container for repository modules.
pub struct Repositories {
    pub profile: Arc<ProfileRepository>,
}

/// Main application state.
///
/// The engine itself must stay on the tick thread; hand out [`App::handle`]
/// to everything else.
pub struct App {
    pub repositories: Repositories,
    pub engine: NarrativeEngine,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        ports: AppPorts,
        settings: EngineSettings,
        request_timeout: Duration,
        book: ScriptBook,
    ) -> Self {
        let profile = Arc::new(ProfileRepository::new(ports.records.clone()));
        let scripted = Arc::new(ScriptedDialogue::new(book));
        let gateway = DialogueGateway::new(
            ports.completion.clone(),
            ports.random.clone(),
            request_timeout,
        );

        let transitions = PhaseTransitions::new(
            profile.clone(),
            ports.companions.clone(),
            scripted.clone(),
            settings.scripted_dialogue,
        );
        let phase_four = PhaseFour::new(
            ports.world.clone(),
            ports.players.clone(),
            ports.companions.clone(),
            ports.random.clone(),
            profile.clone(),
        );
        let scheduler = MessageScheduler::new(ports.chat.clone(), ports.companions.clone());
        let environment = EnvironmentalEventEngine::new(
            ports.world.clone(),
            ports.players.clone(),
            ports.random.clone(),
        );

        let services = EngineServices {
            players: ports.players,
            companions: ports.companions,
            random: ports.random,
            repo: profile.clone(),
            gateway,
            scripted,
            transitions,
            phase_four,
            scheduler,
            environment,
        };

        tracing::debug!(
            model_dialogue = settings.model_dialogue,
            scripted_dialogue = settings.scripted_dialogue,
            reply_delay_ticks = settings.reply_delay_ticks,
            "Narrative engine wired"
        );

        Self {
            repositories: Repositories { profile },
            engine: NarrativeEngine::new(services, settings),
        }
    }

    /// Wire from configuration, loading the configured script book.
    pub fn from_config(ports: AppPorts, config: &NarrativeConfig) -> Result<Self, AppError> {
        let book = load_script_book(config.script_book.as_deref())?;
        Ok(Self::new(
            ports,
            EngineSettings::from(config),
            config.llm.request_timeout,
            book,
        ))
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle::new(self.engine.sender())
    }
}
