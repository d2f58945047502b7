//! Mine sweeper implementation.
//!
//! A 5×5 board hides 3, 5 or 10 mines depending on the difficulty, placed
//! uniformly at the start of the round. Every safe reveal raises the pot:
//!
//! multiplier = round(Π (tilesRemaining / safeTilesRemaining) × scale, 2)
//!
//! with the product taken over the reveals so far and the scale set by the
//! difficulty (0.90 / 1.00 / 1.15). Multipliers are carried in hundredths.
//!
//! Hitting a mine loses and flips the whole board. Cash out is allowed after
//! at least one safe reveal and pays floor(bet × multiplier); revealing every
//! safe tile cashes out automatically. The lucky reveal uncovers a random
//! safe tile, twice per round.
//!
//! Details blob format:
//! [mines:u8] [revealed:u8] [hitTile:u8] [multiplierCents:u32 BE] [luckyUsed:u8]
//!
//! Payload format:
//! [0, row, col] = Reveal tile
//! [1] = Lucky reveal
//! [2] = Cashout

use super::{
    payload_arg, payload_tag, CasinoGame, GameError, GameResult, GameRng, RandomSource, Round,
};
use sidebet_types::casino::{GameType, Highlight, Settlement};
use tracing::debug;

pub const BOARD_SIZE: u8 = 5;
pub const TILES: usize = (BOARD_SIZE * BOARD_SIZE) as usize;
pub const LUCKY_REVEALS: u8 = 2;
/// Hundredths in 1.00x.
pub const CENTS: u64 = 100;
const NO_TILE: u8 = 0xFF;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Difficulty {
    Easy = 0,
    #[default]
    Medium = 1,
    Hard = 2,
}

impl Difficulty {
    pub fn mines(&self) -> u8 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 5,
            Difficulty::Hard => 10,
        }
    }

    pub fn safe_tiles(&self) -> u8 {
        TILES as u8 - self.mines()
    }

    /// Scale applied to the fair multiplier, in basis points.
    pub fn scale_bps(&self) -> u64 {
        match self {
            Difficulty::Easy => 9_000,
            Difficulty::Medium => 10_000,
            Difficulty::Hard => 11_500,
        }
    }

    /// Pot multiplier after `revealed` safe tiles, in hundredths.
    pub fn multiplier_cents(&self, revealed: u8) -> u64 {
        let tiles = TILES as f64;
        let mines = self.mines() as f64;
        let revealed = revealed.min(self.safe_tiles());
        let fair = (0..revealed).fold(1.0f64, |acc, i| {
            let i = i as f64;
            acc * (tiles - i) / (tiles - mines - i)
        });
        (fair * self.scale_bps() as f64 / 100.0).round() as u64
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Difficulty::Easy),
            1 => Ok(Difficulty::Medium),
            2 => Ok(Difficulty::Hard),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tile {
    #[default]
    Hidden,
    Safe,
    Mine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Reveal { row: u8, col: u8 },
    Lucky,
    Cashout,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinesState {
    pub difficulty: Difficulty,
    pub tiles: [Tile; TILES],
    pub revealed: u8,
    pub multiplier_cents: u64,
    pub lucky_left: u8,
    /// Tile index of the mine that ended the round.
    pub hit: Option<u8>,
}

pub struct MineSweeper<R = GameRng> {
    rng: R,
    difficulty: Difficulty,
    mines: [bool; TILES],
    round: Round<MinesState>,
}

impl<R: RandomSource> MineSweeper<R> {
    pub fn new(rng: R) -> Self {
        Self::with_difficulty(rng, Difficulty::default())
    }

    pub fn with_difficulty(rng: R, difficulty: Difficulty) -> Self {
        Self {
            rng,
            difficulty,
            mines: [false; TILES],
            round: Round::new(GameType::MineSweeper),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        if self.round.is_active() {
            return Err(GameError::RoundInProgress);
        }
        self.difficulty = difficulty;
        Ok(())
    }

    pub fn reveal(&mut self, row: u8, col: u8) -> Result<GameResult, GameError> {
        self.round.ensure_active()?;
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(GameError::InvalidMove);
        }
        self.open((row * BOARD_SIZE + col) as usize)
    }

    /// Reveal a random hidden safe tile.
    pub fn lucky_reveal(&mut self) -> Result<GameResult, GameError> {
        let state = self.round.active_state()?;
        if state.lucky_left == 0 {
            return Err(GameError::LimitReached);
        }
        let candidates: Vec<usize> = (0..TILES)
            .filter(|&i| !self.mines[i] && state.tiles[i] == Tile::Hidden)
            .collect();
        if candidates.is_empty() {
            return Err(GameError::InvalidMove);
        }
        let idx = candidates[self.rng.next_bounded(candidates.len() as u32) as usize];
        state.lucky_left -= 1;
        debug!(tile = idx, left = state.lucky_left, "lucky reveal");
        self.open(idx)
    }

    pub fn cash_out(&mut self) -> Result<GameResult, GameError> {
        self.round.ensure_active()?;
        let state = self.round.state();
        if state.revealed == 0 {
            return Err(GameError::InvalidMove);
        }
        let payout = self.pot(state.multiplier_cents);
        Ok(self.round.resolve(Settlement::win(payout)))
    }

    /// floor(bet × multiplier)
    fn pot(&self, multiplier_cents: u64) -> u64 {
        let value = self.round.bet() as u128 * multiplier_cents as u128 / CENTS as u128;
        value.min(u64::MAX as u128) as u64
    }

    fn open(&mut self, idx: usize) -> Result<GameResult, GameError> {
        let difficulty = self.difficulty;
        let mines = self.mines;
        let state = self.round.active_state()?;
        if state.tiles[idx] != Tile::Hidden {
            return Err(GameError::InvalidMove);
        }

        if mines[idx] {
            for (tile, mine) in state.tiles.iter_mut().zip(mines.iter()) {
                *tile = if *mine { Tile::Mine } else { Tile::Safe };
            }
            state.hit = Some(idx as u8);
            return Ok(self.round.resolve(Settlement::loss()));
        }

        state.tiles[idx] = Tile::Safe;
        state.revealed += 1;
        state.multiplier_cents = difficulty.multiplier_cents(state.revealed);
        if state.revealed < difficulty.safe_tiles() {
            return Ok(GameResult::Continue);
        }

        // Board cleared
        for (tile, mine) in state.tiles.iter_mut().zip(mines.iter()) {
            if *mine {
                *tile = Tile::Mine;
            }
        }
        let payout = self.pot(self.round.state().multiplier_cents);
        Ok(self.round.resolve(Settlement::win(payout)))
    }
}

impl<R: RandomSource> CasinoGame for MineSweeper<R> {
    type State = MinesState;
    type Move = Move;

    fn round(&self) -> &Round<MinesState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;

        let mut order: Vec<u8> = (0..TILES as u8).collect();
        self.rng.shuffle(&mut order);
        self.mines = [false; TILES];
        for &tile in order.iter().take(self.difficulty.mines() as usize) {
            self.mines[tile as usize] = true;
        }

        let state = self.round.active_state()?;
        state.difficulty = self.difficulty;
        state.lucky_left = LUCKY_REVEALS;
        state.multiplier_cents = self.difficulty.multiplier_cents(0);
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match mv {
            Move::Reveal { row, col } => self.reveal(row, col),
            Move::Lucky => self.lucky_reveal(),
            Move::Cashout => self.cash_out(),
        }
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        match payload_tag(payload)? {
            0 => Ok(Move::Reveal {
                row: payload_arg(payload, 1)?,
                col: payload_arg(payload, 2)?,
            }),
            1 => Ok(Move::Lucky),
            2 => Ok(Move::Cashout),
            _ => Err(GameError::InvalidPayload),
        }
    }

    fn reset(&mut self) {
        self.mines = [false; TILES];
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let mut details = Vec::with_capacity(8);
        details.push(state.difficulty.mines());
        details.push(state.revealed);
        details.push(state.hit.unwrap_or(NO_TILE));
        let multiplier = state.multiplier_cents.min(u32::MAX as u64) as u32;
        details.extend_from_slice(&multiplier.to_be_bytes());
        details.push(LUCKY_REVEALS.saturating_sub(state.lucky_left));
        details
    }

    fn highlight(&self) -> Option<Highlight> {
        let state = self.round.state();
        (self.round.settlement().is_some() && state.revealed == state.difficulty.safe_tiles())
            .then_some(Highlight::BoardCleared)
    }
}
