//! End-to-end scenarios.
//!
//! Each test wires the full [`App`](crate::App) over the in-memory world,
//! JSON save files in a temporary directory and a canned completion
//! endpoint, then drives it with game events and ticks.
//!
//! ```bash
//! cargo test -p minefriend-engine --lib e2e_tests
//! ```

mod canned_completion;
mod e2e_helpers;

pub use canned_completion::*;
pub use e2e_helpers::*;
