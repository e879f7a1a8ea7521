//! The narrative engine: event routing, reply hand-off and the tick pass.

mod dispatch;
mod engine;
mod events;

pub use dispatch::{ReplyDispatcher, ReplyRequest};
pub use engine::{EngineServices, EngineSettings, NarrativeEngine, HARDCORE_RESPAWN_MESSAGE};
pub use events::{GameEvent, Inbound};
