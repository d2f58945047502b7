/// Maximum name length for a player profile
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum length of the per-game details blob in an outcome record
pub const MAX_DETAILS_LENGTH: usize = 256;

/// Maximum payload length for game moves
pub const MAX_PAYLOAD_LENGTH: usize = 16;

/// Balance granted to a fresh profile
pub const STARTING_BALANCE: u64 = 1_000;

/// XP granted for every resolved round
pub const XP_PER_ROUND: u64 = 5;

/// Additional XP granted when a round is won
pub const XP_PER_WIN: u64 = 10;

/// XP required per level
pub const XP_PER_LEVEL: u64 = 500;

// Recommended presentation pacing. Outcomes are always resolved before the
// animation starts, so these carry no correctness meaning.
pub const SLOT_SPIN_ANIMATION_MS: u64 = 2_000;
pub const COIN_FLIP_ANIMATION_MS: u64 = 1_500;
pub const DICE_ROLL_ANIMATION_MS: u64 = 1_000;
pub const WHEEL_SPIN_ANIMATION_MS: u64 = 4_000;
pub const DEAL_ANIMATION_MS: u64 = 400;
pub const REVEAL_ANIMATION_MS: u64 = 250;

/// Interval between two race simulation ticks
pub const DERBY_TICK_MS: u64 = 50;

/// Total race duration
pub const DERBY_DURATION_MS: u64 = 5_000;
