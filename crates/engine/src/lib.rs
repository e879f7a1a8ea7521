//! MineFriend Engine library.
//!
//! Narrative orchestration for a companion that turns on its player.
//!
//! ## Structure
//!
//! - `use_cases/` - Phase rules, dialogue, scheduling, environmental events, the tick engine
//! - `repositories/` - Profile and companion records over the save record port
//! - `infrastructure/` - Ports plus adapters (HTTP completion, JSON saves, in-memory world)
//! - `api/` - Event handle and console commands
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod repositories;
pub mod use_cases;

/// End-to-end scenarios over the in-memory world.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
