mod companion_record;
mod friend_profile;

pub use companion_record::CompanionRecord;
pub use friend_profile::{
    FriendProfile, BUILT_IN_SKIN_COUNT, MAX_NAME_CHARS, PLAYER_SKIN_INDEX, RANDOM_NAMES,
};
