//! Mini-game execution module.
//!
//! This module contains the game logic for all mini-games:
//! - Slot Machine
//! - Blackjack
//! - Coin Flip
//! - Higher or Lower
//! - Mine Sweeper
//! - Scratch Cards
//! - Wheel of Fortune
//! - Mini Derby
//! - Dice Roll
//! - Mini Poker
//!
//! Every engine owns a [`Round`] (the shared idle → active → resolved
//! lifecycle) and an injected [`RandomSource`]. Outcomes are resolved
//! synchronously by the action that ends the round; animations are replayed
//! by the caller afterwards.

pub mod arcade;
pub mod blackjack;
pub mod coin_flip;
pub mod derby;
pub mod dice;
pub mod hilo;
pub mod mines;
pub mod mini_poker;
pub mod round;
pub mod scratch_cards;
pub mod slot_machine;
pub mod weighted;
pub mod wheel;

pub use arcade::Arcade;
pub use round::{Phase, Round};
pub use weighted::{select, Weighted};

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use sidebet_types::casino::{
    GameEvent, GameType, Highlight, OutcomeRecord, Settlement, MAX_PAYLOAD_LENGTH,
};
use thiserror::Error;

/// Source of randomness consumed by the engines.
///
/// Only [`RandomSource::next_u32`] is required; everything else is derived
/// from it so that a scripted source can force any draw in tests.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in [0.0, 1.0).
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform value in [0, max).
    fn next_bounded(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Rejection sampling for an unbiased distribution
        let limit = u32::MAX - (u32::MAX % max);
        loop {
            let value = self.next_u32();
            if value < limit {
                return value % max;
            }
        }
    }

    /// Roll a single die (1-6).
    fn roll_die(&mut self) -> u8 {
        self.next_bounded(6) as u8 + 1
    }

    /// Shuffle a slice in place using Fisher-Yates.
    fn shuffle<T>(&mut self, slice: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..slice.len()).rev() {
            let j = self.next_bounded((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Create a shuffled deck of 52 cards.
    /// Cards are 0-51: suit = card/13, rank = card%13.
    fn create_deck(&mut self) -> Vec<u8>
    where
        Self: Sized,
    {
        self.create_deck_excluding(&[])
    }

    /// Create a shuffled deck without the given cards.
    fn create_deck_excluding(&mut self, excluded: &[u8]) -> Vec<u8>
    where
        Self: Sized,
    {
        // Use u64 as bit-set for 52 cards (cards 0-51)
        let mut used: u64 = 0;
        for &card in excluded {
            if card < 52 {
                used |= 1u64 << card;
            }
        }
        let mut deck: Vec<u8> = (0..52).filter(|&c| used & (1u64 << c) == 0).collect();
        self.shuffle(&mut deck);
        deck
    }
}

/// Deterministic random number generator.
///
/// Uses SHA256 hash chains to expand a seed into an unbounded byte stream.
/// Two generators built from the same seed and session produce the same
/// sequence, which is what makes rounds replayable.
#[derive(Clone)]
pub struct GameRng {
    state: [u8; 32],
    index: usize,
}

impl GameRng {
    /// Create a new RNG from a seed and a session ID.
    pub fn new(seed: &[u8], session_id: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(&session_id.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(&seed.to_be_bytes(), 0)
    }

    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        let seed: [u8; 32] = rand::random();
        Self::new(&seed, 0)
    }

    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            // Rehash to get more bytes
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }
}

impl RandomSource for GameRng {
    fn next_u32(&mut self) -> u32 {
        u32::from_be_bytes([
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
        ])
    }
}

/// Result of processing a game action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Round is still in progress, state updated.
    Continue,
    /// Round is still in progress and the caller must take an additional
    /// stake of this amount (e.g. holding a slot reel).
    ContinueWithCharge(u64),
    /// Round resolved. The payout is the TOTAL RETURN (stake + profit).
    Complete(Settlement),
}

impl GameResult {
    pub fn is_complete(&self) -> bool {
        matches!(self, GameResult::Complete(_))
    }
}

/// Error during game execution.
///
/// Every error leaves the engine exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// Bet must be a positive amount.
    #[error("bet must be positive")]
    InvalidBet,
    /// A round is already running on this engine.
    #[error("round already in progress")]
    RoundInProgress,
    /// The action needs a running round.
    #[error("no active round")]
    NoActiveRound,
    /// Round has already been resolved.
    #[error("round already complete")]
    GameAlreadyComplete,
    /// Invalid move for the current game state.
    #[error("invalid move")]
    InvalidMove,
    /// Invalid payload format or content.
    #[error("invalid payload")]
    InvalidPayload,
    /// A limited-use action has no uses left this round.
    #[error("no uses left this round")]
    LimitReached,
}

/// Lifecycle shared by every game.
///
/// Engines implement the required methods; the provided ones derive the
/// settlement, snapshot, record and event from the engine's [`Round`].
pub trait CasinoGame {
    /// Observable state. Hidden information (undealt cards, mine positions,
    /// unscratched prizes) is kept outside of it.
    type State: Clone + Default;
    /// Game-specific action.
    type Move: Copy;

    fn round(&self) -> &Round<Self::State>;

    /// Begin a round with a positive bet. Some games resolve immediately
    /// (e.g. blackjack when the deal reaches 21).
    fn start(&mut self, bet: u64) -> Result<GameResult, GameError>;

    fn play(&mut self, mv: Self::Move) -> Result<GameResult, GameError>;

    /// Decode a move from its wire payload (documented per game).
    fn decode_move(payload: &[u8]) -> Result<Self::Move, GameError>;

    /// Return to a pristine idle state, discarding any round in flight.
    /// Configuration (theme, difficulty, tier, modes) is kept.
    fn reset(&mut self);

    /// Compact summary of the resolved round for the history collaborator.
    fn details(&self) -> Vec<u8>;

    fn highlight(&self) -> Option<Highlight> {
        None
    }

    fn game_type(&self) -> GameType {
        self.round().game_type()
    }

    /// Settlement of the resolved round.
    ///
    /// Before resolution this returns the default loss with a zero payout;
    /// callers should only read it once an action returned
    /// [`GameResult::Complete`].
    fn end(&self) -> Settlement {
        self.round().settlement().unwrap_or_default()
    }

    fn state(&self) -> Self::State {
        self.round().state().clone()
    }

    /// Decode and apply a move. Payloads over [MAX_PAYLOAD_LENGTH] bytes are
    /// rejected before decoding.
    fn process_move(&mut self, payload: &[u8]) -> Result<GameResult, GameError> {
        if payload.len() > MAX_PAYLOAD_LENGTH {
            return Err(GameError::InvalidPayload);
        }
        let mv = Self::decode_move(payload)?;
        self.play(mv)
    }

    fn record(&self) -> Option<OutcomeRecord> {
        let round = self.round();
        let settlement = round.settlement()?;
        Some(OutcomeRecord {
            game_type: round.game_type(),
            bet: round.wagered(),
            outcome: settlement.outcome,
            payout: settlement.payout,
            details: self.details(),
        })
    }

    fn event(&self) -> Option<GameEvent> {
        let round = self.round();
        let settlement = round.settlement()?;
        Some(GameEvent {
            game_type: round.game_type(),
            outcome: settlement.outcome,
            bet: round.wagered(),
            payout: settlement.payout,
            highlight: self.highlight(),
        })
    }
}

/// Multiply `bet` by a multiplier expressed in basis points, flooring the
/// result.
pub fn apply_bps(bet: u64, multiplier_bps: u64) -> u64 {
    let value = (bet as u128) * (multiplier_bps as u128) / BPS as u128;
    value.min(u64::MAX as u128) as u64
}

/// Basis points in 1.0x.
pub const BPS: u64 = 10_000;

/// Card drawn when every source of cards is exhausted. Only reachable if the
/// deck bookkeeping is broken; it keeps the round alive instead of failing.
pub const FALLBACK_CARD: u8 = 0;

/// Marker for a card that is dealt but not yet visible.
pub const CARD_HIDDEN: u8 = 0xFF;

/// Payload tag of the first byte, or `InvalidPayload` when empty.
fn payload_tag(payload: &[u8]) -> Result<u8, GameError> {
    payload.first().copied().ok_or(GameError::InvalidPayload)
}

/// Payload argument at `idx`, or `InvalidPayload` when missing.
fn payload_arg(payload: &[u8], idx: usize) -> Result<u8, GameError> {
    payload.get(idx).copied().ok_or(GameError::InvalidPayload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_rng_deterministic() {
        let mut rng1 = GameRng::new(b"seed", 1);
        let mut rng2 = GameRng::new(b"seed", 1);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_game_rng_different_sessions() {
        let mut rng1 = GameRng::new(b"seed", 1);
        let mut rng2 = GameRng::new(b"seed", 2);

        let seq1: Vec<u32> = (0..10).map(|_| rng1.next_u32()).collect();
        let seq2: Vec<u32> = (0..10).map(|_| rng2.next_u32()).collect();
        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_game_rng_bounded() {
        let mut rng = GameRng::from_seed(7);
        for _ in 0..1000 {
            assert!(rng.next_bounded(52) < 52);
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }
        assert_eq!(rng.next_bounded(0), 0);
    }

    #[test]
    fn test_game_rng_deck() {
        let mut rng = GameRng::from_seed(1);
        let deck = rng.create_deck();

        assert_eq!(deck.len(), 52);
        let mut seen = [false; 52];
        for card in &deck {
            assert!(!seen[*card as usize], "Duplicate card: {}", card);
            seen[*card as usize] = true;
        }
    }

    #[test]
    fn test_deck_excluding() {
        let mut rng = GameRng::from_seed(1);
        let deck = rng.create_deck_excluding(&[0, 13, 51]);
        assert_eq!(deck.len(), 49);
        assert!(!deck.contains(&0) && !deck.contains(&13) && !deck.contains(&51));
    }

    #[test]
    fn test_game_rng_dice() {
        let mut rng = GameRng::from_seed(3);
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let roll = rng.roll_die();
            assert!((1..=6).contains(&roll));
            seen[roll as usize - 1] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_apply_bps() {
        assert_eq!(apply_bps(10, 12_000), 12);
        assert_eq!(apply_bps(7, 15_000), 10); // 10.5 floors
        assert_eq!(apply_bps(u64::MAX, 20_000), u64::MAX);
    }

    #[test]
    fn test_payload_helpers() {
        assert_eq!(payload_tag(&[]), Err(GameError::InvalidPayload));
        assert_eq!(payload_tag(&[3, 4]), Ok(3));
        assert_eq!(payload_arg(&[3, 4], 1), Ok(4));
        assert_eq!(payload_arg(&[3], 1), Err(GameError::InvalidPayload));
    }
}
