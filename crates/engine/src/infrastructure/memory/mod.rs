//! In-process collaborators for the console binary and for tests.

mod chat;
mod records;
mod world;

pub use chat::RecordingChat;
pub use records::MemorySaveRecords;
pub use world::{MemoryWorld, CHEST_SLOTS, FLAT_GROUND_Y};
