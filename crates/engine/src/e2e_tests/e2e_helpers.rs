//! E2E test helpers for constructing the full application stack.

use std::sync::Arc;
use std::time::Duration;

use minefriend_domain::{
    ActorId, BlockPos, BlockState, FriendProfile, Phase, PlayerId, Vec3, WorldId,
};
use tempfile::TempDir;

use crate::app::{App, AppPorts};
use crate::infrastructure::memory::{MemoryWorld, RecordingChat, FLAT_GROUND_Y};
use crate::infrastructure::ports::{CompletionPort, WorldPort};
use crate::infrastructure::random::FixedRandom;
use crate::infrastructure::save_files::JsonFileSaveRecords;
use crate::infrastructure::script_book::built_in_script_book;
use crate::use_cases::narrative::{EngineSettings, GameEvent};

pub const WORLD_HALF_EXTENT: i32 = 40;
/// Floor of the cave pocket carved under spawn.
pub const POCKET: BlockPos = BlockPos::new(0, 30, 0);

/// Model replies on, scripted tables off.
pub fn model_only() -> EngineSettings {
    EngineSettings {
        model_dialogue: true,
        scripted_dialogue: false,
        reply_delay_ticks: 20,
    }
}

/// Everything under test, plus the in-memory world it runs in.
pub struct E2ETestContext {
    pub app: App,
    pub world: Arc<MemoryWorld>,
    pub chat: Arc<RecordingChat>,
    pub world_id: WorldId,
    pub player: PlayerId,
    _temp_dir: TempDir,
}

impl E2ETestContext {
    pub fn setup(completion: Arc<dyn CompletionPort>, settings: EngineSettings) -> Self {
        Self::setup_with_timeout(completion, settings, Duration::from_secs(60))
    }

    pub fn setup_with_timeout(
        completion: Arc<dyn CompletionPort>,
        settings: EngineSettings,
        request_timeout: Duration,
    ) -> Self {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let world = Arc::new(MemoryWorld::new());
        let world_id = world.add_flat_world(WORLD_HALF_EXTENT);
        world.set_block(world_id, POCKET, BlockState::AIR);
        world.set_block(world_id, POCKET.above(), BlockState::AIR);
        let player = world.add_player(
            "Steve",
            world_id,
            Vec3::new(0.5, f64::from(FLAT_GROUND_Y + 1), 0.5),
        );
        let chat = Arc::new(RecordingChat::new());
        let app = build_app(&world, &chat, &temp_dir, completion, settings, request_timeout);

        Self {
            app,
            world,
            chat,
            world_id,
            player,
            _temp_dir: temp_dir,
        }
    }

    /// A fresh App over the same world and save directory, as after a restart.
    pub fn restart(&mut self, completion: Arc<dyn CompletionPort>, settings: EngineSettings) {
        self.app = build_app(
            &self.world,
            &self.chat,
            &self._temp_dir,
            completion,
            settings,
            Duration::from_secs(60),
        );
    }

    pub fn post(&mut self, event: GameEvent) {
        self.app.engine.handle_event(event);
    }

    pub fn join(&mut self) {
        let player = self.player;
        self.post(GameEvent::PlayerJoined { player });
    }

    pub fn leave(&mut self) {
        let player = self.player;
        self.post(GameEvent::PlayerLeft { player });
    }

    pub fn rejoin(&mut self) {
        self.leave();
        self.join();
    }

    pub fn say(&mut self, message: &str) {
        let player = self.player;
        self.post(GameEvent::Chat {
            player,
            message: message.to_string(),
        });
    }

    pub fn tick(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.app.engine.tick();
        }
    }

    /// Let spawned model requests finish, then hand their replies to the engine.
    pub async fn settle(&mut self) {
        for _ in 0..100 {
            if self.app.engine.in_flight(self.player) == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        self.tick(1);
    }

    pub fn phase(&self) -> Option<Phase> {
        self.app.engine.session(self.player).map(|s| s.phase())
    }

    pub fn bound_companion(&self) -> Option<ActorId> {
        self.app
            .engine
            .session(self.player)
            .and_then(|s| s.profile.companion())
    }

    pub fn stored_profile(&self) -> FriendProfile {
        self.app
            .repositories
            .profile
            .load(self.player)
            .expect("load profile")
            .expect("profile saved")
    }

    /// Chat lines as rendered, e.g. `"<Eli> hello"`.
    pub fn rendered_chat(&self) -> Vec<String> {
        self.chat.lines().iter().map(|l| l.render()).collect()
    }
}

fn build_app(
    world: &Arc<MemoryWorld>,
    chat: &Arc<RecordingChat>,
    temp_dir: &TempDir,
    completion: Arc<dyn CompletionPort>,
    settings: EngineSettings,
    request_timeout: Duration,
) -> App {
    let ports = AppPorts {
        world: world.clone(),
        players: world.clone(),
        companions: world.clone(),
        chat: chat.clone(),
        records: Arc::new(JsonFileSaveRecords::new(temp_dir.path())),
        completion,
        random: Arc::new(FixedRandom(0)),
    };
    App::new(
        ports,
        settings,
        request_timeout,
        built_in_script_book().expect("script book"),
    )
}
