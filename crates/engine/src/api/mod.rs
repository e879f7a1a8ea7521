//! API layer - entry points into the running engine.

pub mod console;
pub mod handle;

pub use console::{ConsoleCommand, ConsoleError, ConsoleSession};
pub use handle::{EngineHandle, HandleError};
