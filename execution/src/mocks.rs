//! Deterministic random sources for tests.

use crate::casino::{GameRng, RandomSource};
use std::collections::VecDeque;

/// Random source that replays a fixed script of raw `u32` draws, then falls
/// back to a seeded [`GameRng`].
///
/// Engines derive every draw from [`RandomSource::next_u32`], so small values
/// map directly to outcomes: `next_bounded(n)` returns `v % n` for any
/// scripted `v < n`, and a die roll of `d` is forced with `d - 1`.
pub struct ScriptedRng {
    script: VecDeque<u32>,
    fallback: GameRng,
}

impl ScriptedRng {
    pub fn new(script: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: GameRng::from_seed(0),
        }
    }

    /// Raw draw that makes [`RandomSource::next_f64`] return `f`.
    pub fn fraction(f: f64) -> u32 {
        (f * 4_294_967_296.0) as u32
    }

    /// Append more draws to the script.
    pub fn push(&mut self, values: impl IntoIterator<Item = u32>) {
        self.script.extend(values);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl RandomSource for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        match self.script.pop_front() {
            Some(value) => value,
            None => self.fallback.next_u32(),
        }
    }
}

/// Seeded generator for a test, distinct per `session`.
pub fn create_rng(session: u64) -> GameRng {
    GameRng::new(b"sidebet-test-seed", session)
}
