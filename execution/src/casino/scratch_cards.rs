//! Scratch card implementation.
//!
//! A card has nine panels. The prize is drawn uniformly from the tier's pool
//! when the card is bought; the panel symbols are decoration. Scratching the
//! last panel (or scratching everything at once) settles the card.
//!
//! The card pays its prize whatever the classification: it counts as a win
//! only when the prize exceeds the price, so a small prize is a loss that
//! still returns coins.
//!
//! Details blob format:
//! [tier:u8] [scratched:u8] [prize:u64 BE] [symbols:u8 × 9]
//!
//! Payload format:
//! [0, panel] = Scratch panel (0-8)
//! [1] = Scratch all

use super::{
    payload_arg, payload_tag, CasinoGame, GameError, GameResult, GameRng, RandomSource, Round,
};
use sidebet_types::casino::{GameType, Highlight, Outcome, Settlement};

pub const PANELS: usize = 9;
/// Distinct panel symbols.
pub const SYMBOLS: u32 = 8;

const BRONZE: [u64; 8] = [0, 0, 0, 5, 10, 20, 50, 100];
const SILVER: [u64; 8] = [0, 0, 0, 25, 50, 100, 250, 500];
const GOLD: [u64; 8] = [0, 0, 50, 100, 200, 500, 1_000, 2_500];
const DIAMOND: [u64; 8] = [0, 0, 250, 500, 1_000, 2_500, 5_000, 10_000];

#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tier {
    #[default]
    Bronze = 0,
    Silver = 1,
    Gold = 2,
    Diamond = 3,
}

impl Tier {
    pub fn prizes(&self) -> &'static [u64] {
        match self {
            Tier::Bronze => &BRONZE,
            Tier::Silver => &SILVER,
            Tier::Gold => &GOLD,
            Tier::Diamond => &DIAMOND,
        }
    }

    /// Suggested price of a card.
    pub fn price(&self) -> u64 {
        match self {
            Tier::Bronze => 10,
            Tier::Silver => 50,
            Tier::Gold => 100,
            Tier::Diamond => 500,
        }
    }

    pub fn top_prize(&self) -> u64 {
        self.prizes().iter().copied().max().unwrap_or(0)
    }
}

impl TryFrom<u8> for Tier {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Tier::Bronze),
            1 => Ok(Tier::Silver),
            2 => Ok(Tier::Gold),
            3 => Ok(Tier::Diamond),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Scratch(u8),
    ScratchAll,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScratchState {
    pub tier: Tier,
    /// Symbol under each panel once scratched.
    pub panels: [Option<u8>; PANELS],
    pub scratched: u8,
    /// Known once the card is settled.
    pub prize: Option<u64>,
}

pub struct ScratchCards<R = GameRng> {
    rng: R,
    tier: Tier,
    prize: u64,
    symbols: [u8; PANELS],
    round: Round<ScratchState>,
}

impl<R: RandomSource> ScratchCards<R> {
    pub fn new(rng: R) -> Self {
        Self::with_tier(rng, Tier::default())
    }

    pub fn with_tier(rng: R, tier: Tier) -> Self {
        Self {
            rng,
            tier,
            prize: 0,
            symbols: [0; PANELS],
            round: Round::new(GameType::ScratchCards),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: Tier) -> Result<(), GameError> {
        if self.round.is_active() {
            return Err(GameError::RoundInProgress);
        }
        self.tier = tier;
        Ok(())
    }

    pub fn scratch(&mut self, panel: u8) -> Result<GameResult, GameError> {
        let symbols = self.symbols;
        let state = self.round.active_state()?;
        let panel = panel as usize;
        if panel >= PANELS || state.panels[panel].is_some() {
            return Err(GameError::InvalidMove);
        }
        state.panels[panel] = Some(symbols[panel]);
        state.scratched += 1;
        if (state.scratched as usize) < PANELS {
            return Ok(GameResult::Continue);
        }
        self.settle()
    }

    pub fn scratch_all(&mut self) -> Result<GameResult, GameError> {
        let symbols = self.symbols;
        let state = self.round.active_state()?;
        state.panels = symbols.map(Some);
        state.scratched = PANELS as u8;
        self.settle()
    }

    fn settle(&mut self) -> Result<GameResult, GameError> {
        let prize = self.prize;
        let bet = self.round.bet();
        self.round.active_state()?.prize = Some(prize);
        let outcome = if prize > bet {
            Outcome::Win
        } else {
            Outcome::Loss
        };
        Ok(self.round.resolve(Settlement {
            outcome,
            payout: prize,
        }))
    }
}

impl<R: RandomSource> CasinoGame for ScratchCards<R> {
    type State = ScratchState;
    type Move = Move;

    fn round(&self) -> &Round<ScratchState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;
        let prizes = self.tier.prizes();
        self.prize = prizes[self.rng.next_bounded(prizes.len() as u32) as usize];
        for symbol in self.symbols.iter_mut() {
            *symbol = self.rng.next_bounded(SYMBOLS) as u8;
        }
        self.round.active_state()?.tier = self.tier;
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match mv {
            Move::Scratch(panel) => self.scratch(panel),
            Move::ScratchAll => self.scratch_all(),
        }
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        match payload_tag(payload)? {
            0 => Ok(Move::Scratch(payload_arg(payload, 1)?)),
            1 => Ok(Move::ScratchAll),
            _ => Err(GameError::InvalidPayload),
        }
    }

    fn reset(&mut self) {
        self.prize = 0;
        self.symbols = [0; PANELS];
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let mut details = Vec::with_capacity(10 + PANELS);
        details.push(state.tier as u8);
        details.push(state.scratched);
        details.extend_from_slice(&state.prize.unwrap_or(0).to_be_bytes());
        details.extend(state.panels.iter().map(|p| p.unwrap_or(0xFF)));
        details
    }

    fn highlight(&self) -> Option<Highlight> {
        let state = self.round.state();
        let top = state.tier.top_prize();
        (state.prize == Some(top) && top > 0).then_some(Highlight::Jackpot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_rng, ScriptedRng};

    /// Script a card: prize index followed by nine symbols.
    fn card(prize_idx: u32) -> ScriptedRng {
        let mut script = vec![prize_idx];
        script.extend(0..PANELS as u32);
        ScriptedRng::new(script)
    }

    #[test]
    fn test_pools_include_zero() {
        for tier in [Tier::Bronze, Tier::Silver, Tier::Gold, Tier::Diamond] {
            assert!(tier.prizes().contains(&0));
            assert!(tier.top_prize() > tier.price());
        }
        assert_eq!(Tier::Diamond.top_prize(), 10_000);
    }

    #[test]
    fn test_scratch_one_by_one() {
        let mut game = ScratchCards::new(card(6));
        game.start(10).unwrap();
        for panel in 0..8 {
            assert_eq!(game.scratch(panel), Ok(GameResult::Continue));
        }
        assert_eq!(game.state().prize, None);
        assert_eq!(game.scratch(3), Err(GameError::InvalidMove));

        let result = game.scratch(8).unwrap();
        assert_eq!(result, GameResult::Complete(Settlement::win(50)));
        assert_eq!(game.state().panels[4], Some(4));
        assert_eq!(game.state().prize, Some(50));
    }

    #[test]
    fn test_scratch_all_matches_one_by_one() {
        let mut a = ScratchCards::new(card(5));
        a.start(10).unwrap();
        a.play(Move::ScratchAll).unwrap();

        let mut b = ScratchCards::new(card(5));
        b.start(10).unwrap();
        for panel in (0..9).rev() {
            b.play(Move::Scratch(panel)).unwrap();
        }

        assert_eq!(a.end(), b.end());
        assert_eq!(a.state(), b.state());
        assert_eq!(a.details(), b.details());
    }

    #[test]
    fn test_small_prize_is_a_paying_loss() {
        let mut game = ScratchCards::new(card(3));
        game.start(10).unwrap();
        game.scratch_all().unwrap();
        assert_eq!(game.end().outcome, Outcome::Loss);
        assert_eq!(game.end().payout, 5);

        // Prize equal to the price is not a win
        let mut game = ScratchCards::new(card(4));
        game.start(10).unwrap();
        game.scratch_all().unwrap();
        assert_eq!(game.end(), Settlement { outcome: Outcome::Loss, payout: 10 });
    }

    #[test]
    fn test_top_prize_is_jackpot() {
        let mut game = ScratchCards::with_tier(card(7), Tier::Gold);
        game.start(100).unwrap();
        game.scratch_all().unwrap();
        assert_eq!(game.end(), Settlement::win(2_500));
        assert_eq!(game.highlight(), Some(Highlight::Jackpot));
        assert_eq!(game.details()[..10], [2, 9, 0, 0, 0, 0, 0, 0, 0x09, 0xC4]);
    }

    #[test]
    fn test_invalid_panel() {
        let mut game = ScratchCards::new(create_rng(1));
        assert_eq!(game.scratch(0), Err(GameError::NoActiveRound));
        game.start(10).unwrap();
        assert_eq!(game.scratch(9), Err(GameError::InvalidMove));
        game.scratch_all().unwrap();
        assert_eq!(game.scratch_all(), Err(GameError::GameAlreadyComplete));
    }

    #[test]
    fn test_tier_between_rounds() {
        let mut game = ScratchCards::new(create_rng(2));
        game.start(10).unwrap();
        assert_eq!(game.set_tier(Tier::Gold), Err(GameError::RoundInProgress));
        game.scratch_all().unwrap();
        game.set_tier(Tier::Gold).unwrap();
        game.start(100).unwrap();
        assert_eq!(game.state().tier, Tier::Gold);
    }
}
