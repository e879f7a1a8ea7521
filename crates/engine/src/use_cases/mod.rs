//! Use cases - companion story orchestration.
//!
//! Each module covers one part of the narrative. `narrative` ties them
//! together on the tick thread.

pub mod dialogue;
pub mod environment;
pub mod narrative;
pub mod phase;
pub mod scheduler;
pub mod session;

// Re-export main types
pub use environment::EnvironmentalEventEngine;
pub use narrative::{EngineServices, EngineSettings, GameEvent, Inbound, NarrativeEngine};
pub use phase::{PhaseFour, PhaseTransitions};
pub use scheduler::MessageScheduler;
pub use session::{DialogueSession, SessionRegistry};
