//! Session use cases.
//!
//! Tracks connected players and the transient state attached to them.

mod dialogue_session;
mod registry;

pub use dialogue_session::DialogueSession;
pub use registry::SessionRegistry;
