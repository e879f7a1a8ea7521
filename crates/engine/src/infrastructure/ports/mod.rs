//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - The completion endpoint (any chat-style HTTP backend)
//! - The running simulation (world cells, players, the companion, chat)
//! - Save records
//! - Random (for testing)

mod error;
mod external;
mod persistence;
mod testing;
mod world;

pub use error::{LlmError, RepoError};
pub use external::{ChatMessage, CompletionPort, CompletionRequest, MessageRole};
pub use persistence::SaveRecordPort;
pub use testing::RandomPort;
pub use world::{
    ChatLine, ChatPort, CompanionAppearance, CompanionPort, PlayerPort, PlayerSnapshot, WorldPort,
};

#[cfg(test)]
pub use external::MockCompletionPort;
#[cfg(test)]
pub use persistence::MockSaveRecordPort;
#[cfg(test)]
pub use world::{MockChatPort, MockCompanionPort, MockPlayerPort, MockWorldPort};
