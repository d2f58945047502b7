pub mod casino;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use casino::{
    Arcade, CasinoGame, GameError, GameResult, GameRng, Phase, RandomSource, Round,
};
