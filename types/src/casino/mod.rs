mod codec;
mod constants;
mod economy;
mod game;
mod player;
mod stats;

pub use codec::{clamp_string, read_string, string_encode_size, write_string};
pub use constants::*;
pub use economy::*;
pub use game::*;
pub use player::*;
pub use stats::*;

#[cfg(test)]
mod tests;
