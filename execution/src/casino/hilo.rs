//! Higher or lower implementation.
//!
//! A rank from 1 (ace) to 13 (king) is shown. Each guess draws a new uniform
//! rank; a strictly higher (or lower) draw extends the streak, anything else
//! ends the round with nothing. Equal ranks lose both ways.
//!
//! A guess that cannot win (higher from a king, lower from an ace) is
//! rejected with [`GameError::InvalidMove`] and leaves the round untouched,
//! so no rank is drawn and the streak stands.
//!
//! The pot multiplier grows with the streak following [`STREAK_MULTIPLIERS`]
//! and is paid on cash out. Streaks beyond ten keep the streak-10 value.
//!
//! Details blob format:
//! [lastRank:u8] [streak:u8] [multiplierBps:u32 BE]
//!
//! Payload format:
//! [0] = Higher - guess next rank is higher
//! [1] = Lower - guess next rank is lower
//! [2] = Cashout - take current pot

use super::{
    apply_bps, payload_tag, CasinoGame, GameError, GameResult, GameRng, RandomSource, Round,
};
use sidebet_types::casino::{GameType, Highlight, Settlement};
use tracing::debug;

pub const MIN_RANK: u8 = 1;
pub const MAX_RANK: u8 = 13;

/// Cash out multiplier in basis points for streaks 1 through 10.
pub const STREAK_MULTIPLIERS: [u64; 10] = [
    12_000, 15_000, 20_000, 30_000, 50_000, 80_000, 120_000, 150_000, 300_000, 500_000,
];

/// Streak reported as a highlight.
const HIGHLIGHT_STREAK: u32 = 5;

/// HiLo move types
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Higher = 0,
    Lower = 1,
    Cashout = 2,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Higher),
            1 => Ok(Move::Lower),
            2 => Ok(Move::Cashout),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// Multiplier for a streak, in basis points. Zero for no streak.
pub fn streak_multiplier(streak: u32) -> u64 {
    match streak {
        0 => 0,
        n => STREAK_MULTIPLIERS[(n as usize).min(STREAK_MULTIPLIERS.len()) - 1],
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HiLoState {
    /// Rank on display (1-13).
    pub current: u8,
    pub streak: u32,
    /// Rank that ended the round on a wrong guess.
    pub busted_on: Option<u8>,
}

impl HiLoState {
    pub fn multiplier_bps(&self) -> u64 {
        streak_multiplier(self.streak)
    }
}

pub struct HigherOrLower<R = GameRng> {
    rng: R,
    round: Round<HiLoState>,
}

impl<R: RandomSource> HigherOrLower<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            round: Round::new(GameType::HigherOrLower),
        }
    }

    fn draw_rank(&mut self) -> u8 {
        self.rng.next_bounded(MAX_RANK as u32) as u8 + MIN_RANK
    }

    /// Guess the direction of the next rank.
    pub fn guess(&mut self, higher: bool) -> Result<GameResult, GameError> {
        let current = self.round.active_state()?.current;

        // Check for impossible guesses
        if (higher && current == MAX_RANK) || (!higher && current == MIN_RANK) {
            return Err(GameError::InvalidMove);
        }

        let next = self.draw_rank();
        let correct = if higher { next > current } else { next < current };
        let state = self.round.active_state()?;
        if correct {
            state.current = next;
            state.streak = state.streak.saturating_add(1);
            debug!(streak = state.streak, rank = next, "streak extended");
            return Ok(GameResult::Continue);
        }

        state.busted_on = Some(next);
        Ok(self.round.resolve(Settlement::loss()))
    }

    /// Take the pot for the current streak.
    pub fn cash_out(&mut self) -> Result<GameResult, GameError> {
        let multiplier = self.round.active_state()?.multiplier_bps();
        if multiplier == 0 {
            return Err(GameError::InvalidMove);
        }
        let payout = apply_bps(self.round.bet(), multiplier);
        Ok(self.round.resolve(Settlement::win(payout)))
    }
}

impl<R: RandomSource> CasinoGame for HigherOrLower<R> {
    type State = HiLoState;
    type Move = Move;

    fn round(&self) -> &Round<HiLoState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;
        let first = self.draw_rank();
        self.round.active_state()?.current = first;
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match mv {
            Move::Higher => self.guess(true),
            Move::Lower => self.guess(false),
            Move::Cashout => self.cash_out(),
        }
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        Move::try_from(payload_tag(payload)?)
    }

    fn reset(&mut self) {
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let mut details = Vec::with_capacity(6);
        details.push(state.busted_on.unwrap_or(state.current));
        details.push(state.streak.min(u8::MAX as u32) as u8);
        details.extend_from_slice(&(state.multiplier_bps() as u32).to_be_bytes());
        details
    }

    fn highlight(&self) -> Option<Highlight> {
        let streak = self.round.state().streak;
        let won = self.round.settlement().is_some_and(|s| s.payout > 0);
        if !won || streak < HIGHLIGHT_STREAK {
            return None;
        }
        Some(Highlight::Streak(streak.min(u8::MAX as u32) as u8))
    }
}
