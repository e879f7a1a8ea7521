//! MineFriend console - one player, their companion and a small in-memory world.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use minefriend_domain::{
    BlockKind, BlockPart, BlockPos, BlockState, Direction, DoorMaterial, DyeColor, PlayerId, Vec3,
    WorldId,
};
use minefriend_engine::api::{ConsoleCommand, ConsoleSession};
use minefriend_engine::app::{App, AppPorts};
use minefriend_engine::infrastructure::completion_http::{
    check_endpoint, HttpCompletionClient, CONNECT_CHECK_TIMEOUT,
};
use minefriend_engine::infrastructure::config::NarrativeConfig;
use minefriend_engine::infrastructure::memory::{MemoryWorld, RecordingChat, FLAT_GROUND_Y};
use minefriend_engine::infrastructure::ports::WorldPort;
use minefriend_engine::infrastructure::random::SystemRandom;
use minefriend_engine::infrastructure::save_files::JsonFileSaveRecords;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 20 simulation ticks per second.
const TICK: Duration = Duration::from_millis(50);
const WORLD_HALF_EXTENT: i32 = 48;
const DEFAULT_SAVE_DIR: &str = "minefriend-saves";
const PLAYER_ID_FILE: &str = "console-player";
const PLAYER_NAME: &str = "Steve";
/// Cave tunnels run along every line where x or z is a multiple of this.
const TUNNEL_SPACING: i32 = 8;
const TUNNEL_FLOOR_Y: i32 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minefriend_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting MineFriend console");

    // Load configuration
    let config = NarrativeConfig::from_env()?;
    let save_dir = std::env::var("COMPANION_SAVE_DIR").unwrap_or_else(|_| DEFAULT_SAVE_DIR.into());

    if config.model_dialogue {
        match check_endpoint(&config.llm.url, CONNECT_CHECK_TIMEOUT).await {
            Ok(()) => tracing::info!(url = %config.llm.url, "Completion endpoint reachable"),
            Err(e) => tracing::warn!(
                error = %e,
                url = %config.llm.url,
                "Completion endpoint unreachable, replies will fall back"
            ),
        }
    }

    let world = Arc::new(MemoryWorld::echoing());
    let world_id = world.add_flat_world(WORLD_HALF_EXTENT);
    furnish(&world, world_id);
    let player = world.add_player_with_id(
        console_player_id(Path::new(&save_dir))?,
        PLAYER_NAME,
        world_id,
        Vec3::new(0.5, f64::from(FLAT_GROUND_Y + 1), 0.5),
    );

    let ports = AppPorts {
        world: world.clone(),
        players: world.clone(),
        companions: world.clone(),
        chat: Arc::new(RecordingChat::echoing()),
        records: Arc::new(JsonFileSaveRecords::new(&save_dir)),
        completion: Arc::new(HttpCompletionClient::from_config(&config.llm)),
        random: Arc::new(SystemRandom::new()),
    };
    let mut app = App::from_config(ports, &config)?;
    let console = ConsoleSession::new(player, app.handle(), world.clone());
    tracing::info!(
        player_id = %player,
        save_dir = %save_dir,
        model = %config.llm.model,
        "Console ready. Type to chat; /attack, /rejoin, /respawn, /quit"
    );
    app.handle().join(player)?;

    // Stdin reader
    let (lines_tx, mut lines) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = stdin.next_line().await {
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut ticker = tokio::time::interval(TICK);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                world.advance_tick();
                app.engine.tick();
            }
            line = lines.recv() => {
                let command = match line {
                    Some(line) => match ConsoleCommand::parse(&line) {
                        Ok(Some(command)) => command,
                        Ok(None) => continue,
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    },
                    None => ConsoleCommand::Quit,
                };
                let quit = command == ConsoleCommand::Quit;
                if let Err(e) = console.apply(command) {
                    println!("{e}");
                }
                if quit {
                    // Let the engine save the session before exiting.
                    app.engine.tick();
                    break;
                }
            }
        }
    }

    tracing::info!("MineFriend console stopped");
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

/// The same player id across runs, so saved profiles are found again.
fn console_player_id(save_dir: &Path) -> anyhow::Result<PlayerId> {
    let path = save_dir.join(PLAYER_ID_FILE);
    if let Ok(text) = std::fs::read_to_string(&path) {
        if let Ok(uuid) = uuid::Uuid::parse_str(text.trim()) {
            return Ok(PlayerId::from_uuid(uuid));
        }
        tracing::warn!(path = %path.display(), "Ignoring unreadable console player id");
    }
    let id = PlayerId::new();
    std::fs::create_dir_all(save_dir)?;
    std::fs::write(&path, id.to_string())?;
    Ok(id)
}

/// A bed, torch, chest, door and crop near spawn, with cave tunnels below.
fn furnish(world: &MemoryWorld, id: WorldId) {
    let ground = FLAT_GROUND_Y + 1;

    let bed = BlockState::of(BlockKind::Bed(DyeColor::Red)).facing(Direction::East);
    let foot = BlockPos::new(3, ground, 2);
    world.set_block(id, foot, bed.part(BlockPart::Foot));
    world.set_block(id, foot.relative(Direction::East, 1), bed.part(BlockPart::Head));

    world.set_block(id, BlockPos::new(-2, ground, 3), BlockState::of(BlockKind::Torch));
    world.set_block(id, BlockPos::new(2, ground, -3), BlockState::of(BlockKind::Chest));

    let door = BlockState::of(BlockKind::Door(DoorMaterial::Oak)).facing(Direction::West);
    let lower = BlockPos::new(-3, ground, -1);
    world.set_block(id, lower, door.part(BlockPart::Lower));
    world.set_block(id, lower.above(), door.part(BlockPart::Upper));

    let soil = BlockPos::new(5, FLAT_GROUND_Y, 5);
    world.set_block(id, soil, BlockState::of(BlockKind::Farmland));
    world.set_block(id, soil.above(), BlockState::of(BlockKind::Crop));

    for x in -WORLD_HALF_EXTENT..=WORLD_HALF_EXTENT {
        for z in -WORLD_HALF_EXTENT..=WORLD_HALF_EXTENT {
            if x % TUNNEL_SPACING != 0 && z % TUNNEL_SPACING != 0 {
                continue;
            }
            let floor = BlockPos::new(x, TUNNEL_FLOOR_Y, z);
            world.set_block(id, floor, BlockState::AIR);
            world.set_block(id, floor.above(), BlockState::AIR);
        }
    }
}
