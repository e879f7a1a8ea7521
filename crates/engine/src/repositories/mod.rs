//! Repository modules wrapping the save record port.

mod profile;

pub use profile::{ProfileRepository, COMPANION_RECORD_KEY, PROFILE_KEY};
