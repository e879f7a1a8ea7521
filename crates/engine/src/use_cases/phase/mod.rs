//! Phase use cases.
//!
//! Handles the companion's narrative progression:
//! - Validated transitions (reconnect, model hints, hostility, rejections)
//! - Phase four setup and aggression

mod phase_four;
mod transitions;

pub use phase_four::{PhaseFour, ASSAULT_COOLDOWN_TICKS, ASSAULT_DAMAGE, CHASE_SPEED};
pub use transitions::{PhaseTransitions, RejectionOutcome, TransitionReason, REJECTION_LIMIT};
