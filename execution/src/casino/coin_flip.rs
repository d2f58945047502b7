//! Coin flip implementation.
//!
//! Call heads or tails against a fair 50/50 draw; a correct call pays 2× bet.
//!
//! Martingale mode keeps a loss streak across rounds and suggests doubling
//! the previous base bet after every loss. The engine never places the bet
//! itself; callers read [`CoinFlip::next_bet`].
//!
//! Details blob format:
//! [call:u8] [landed:u8] [lossStreak:u8]
//!
//! Payload format:
//! [0] = Heads
//! [1] = Tails

use super::{payload_tag, CasinoGame, GameError, GameResult, GameRng, RandomSource, Round};
use sidebet_types::casino::{GameType, Settlement};
use tracing::debug;

/// Win returns the stake twice.
const PAYOUT_MULTIPLIER: u64 = 2;
/// Loss streak after which the suggested bet stops doubling.
const MAX_DOUBLINGS: u32 = 32;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Heads = 0,
    Tails = 1,
}

impl TryFrom<u8> for Side {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Side::Heads),
            1 => Ok(Side::Tails),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoinFlipState {
    pub call: Option<Side>,
    pub landed: Option<Side>,
}

pub struct CoinFlip<R = GameRng> {
    rng: R,
    martingale: bool,
    loss_streak: u32,
    base_bet: u64,
    round: Round<CoinFlipState>,
}

impl<R: RandomSource> CoinFlip<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            martingale: false,
            loss_streak: 0,
            base_bet: 0,
            round: Round::new(GameType::CoinFlip),
        }
    }

    pub fn martingale(&self) -> bool {
        self.martingale
    }

    /// Toggle martingale suggestions. Turning it off clears the streak.
    pub fn set_martingale(&mut self, enabled: bool) -> Result<(), GameError> {
        if self.round.is_active() {
            return Err(GameError::RoundInProgress);
        }
        self.martingale = enabled;
        if !enabled {
            self.loss_streak = 0;
        }
        Ok(())
    }

    pub fn loss_streak(&self) -> u32 {
        self.loss_streak
    }

    /// Suggested stake for the next round: the base bet doubled once per
    /// consecutive loss. `None` unless martingale mode is on and a round has
    /// been played.
    pub fn next_bet(&self) -> Option<u64> {
        if !self.martingale || self.base_bet == 0 {
            return None;
        }
        let doublings = self.loss_streak.min(MAX_DOUBLINGS);
        Some(self.base_bet.saturating_mul(1u64 << doublings))
    }

    /// Call a side and flip.
    pub fn flip(&mut self, call: Side) -> Result<GameResult, GameError> {
        self.round.ensure_active()?;
        let landed = if self.rng.next_bounded(2) == 0 {
            Side::Heads
        } else {
            Side::Tails
        };
        let state = self.round.active_state()?;
        state.call = Some(call);
        state.landed = Some(landed);

        let bet = self.round.bet();
        let settlement = if call == landed {
            self.loss_streak = 0;
            self.base_bet = bet;
            Settlement::win(bet.saturating_mul(PAYOUT_MULTIPLIER))
        } else {
            // Base stays at the stake that opened the losing run
            if self.loss_streak == 0 {
                self.base_bet = bet;
            }
            self.loss_streak = self.loss_streak.saturating_add(1);
            Settlement::loss()
        };
        if self.martingale {
            debug!(
                loss_streak = self.loss_streak,
                next_bet = ?self.next_bet(),
                "martingale updated"
            );
        }
        Ok(self.round.resolve(settlement))
    }
}

impl<R: RandomSource> CasinoGame for CoinFlip<R> {
    type State = CoinFlipState;
    type Move = Side;

    fn round(&self) -> &Round<CoinFlipState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Side) -> Result<GameResult, GameError> {
        self.flip(mv)
    }

    fn decode_move(payload: &[u8]) -> Result<Side, GameError> {
        Side::try_from(payload_tag(payload)?)
    }

    fn reset(&mut self) {
        self.loss_streak = 0;
        self.base_bet = 0;
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let side = |s: Option<Side>| s.map_or(0xFF, |s| s as u8);
        vec![
            side(state.call),
            side(state.landed),
            self.loss_streak.min(u8::MAX as u32) as u8,
        ]
    }
}
