//! Dice roll implementation.
//!
//! Two six-sided dice against one of ten bet types, each with fixed odds and
//! a predicate over the pair. A win pays floor(bet × odds).
//!
//! | kind | bet        | wins when          | odds           |
//! |------|------------|--------------------|----------------|
//! | 0    | over t     | sum > t (t 7-11)   | 0.95 × 36/ways |
//! | 1    | under t    | sum < t (t 3-7)    | 0.95 × 36/ways |
//! | 2    | exact s    | sum = s (s 2-12)   | 0.95 × 36/ways |
//! | 3    | doubles    | d1 = d2            | 5x   |
//! | 4    | snake eyes | 1 + 1              | 35x  |
//! | 5    | boxcars    | 6 + 6              | 35x  |
//! | 6    | odd        | sum odd            | 2x   |
//! | 7    | even       | sum even           | 2x   |
//! | 8    | high       | sum >= 8           | 2.2x |
//! | 9    | low        | sum <= 6           | 2.2x |
//!
//! Target bets are priced from `ways`, the number of the 36 rolls that win,
//! so over 7 pays 2.28x and exact 2 pays 34.2x. Over and under targets stop
//! where more than half of the rolls would win.
//!
//! Loaded dice (once per round) roll a third die and keep the first two; the
//! extra die is only shown.
//!
//! Details blob format:
//! [kind:u8] [target:u8] [d1:u8] [d2:u8] [loaded:u8]
//!
//! Payload format:
//! [0, kind, target] = Choose bet (target only for kinds 0-2)
//! [1] = Roll
//! [2] = Roll loaded dice

use super::{
    apply_bps, payload_arg, payload_tag, CasinoGame, GameError, GameResult, GameRng,
    RandomSource, Round,
};
use sidebet_types::casino::{GameType, Highlight, Settlement};

/// Equally likely rolls of two dice.
const OUTCOMES: u64 = 36;
/// Expected return of a target bet, in basis points.
const TARGET_RETURN_BPS: u64 = 9_500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiceBet {
    Over(u8),
    Under(u8),
    Exact(u8),
    Doubles,
    SnakeEyes,
    Boxcars,
    Odd,
    Even,
    High,
    Low,
}

impl DiceBet {
    /// Build a bet from its wire kind and target.
    pub fn from_parts(kind: u8, target: Option<u8>) -> Result<Self, GameError> {
        let required = || target.ok_or(GameError::InvalidPayload);
        let bet = match kind {
            0 => DiceBet::Over(required()?),
            1 => DiceBet::Under(required()?),
            2 => DiceBet::Exact(required()?),
            3 => DiceBet::Doubles,
            4 => DiceBet::SnakeEyes,
            5 => DiceBet::Boxcars,
            6 => DiceBet::Odd,
            7 => DiceBet::Even,
            8 => DiceBet::High,
            9 => DiceBet::Low,
            _ => return Err(GameError::InvalidPayload),
        };
        bet.validate()?;
        Ok(bet)
    }

    pub fn kind(&self) -> u8 {
        match self {
            DiceBet::Over(_) => 0,
            DiceBet::Under(_) => 1,
            DiceBet::Exact(_) => 2,
            DiceBet::Doubles => 3,
            DiceBet::SnakeEyes => 4,
            DiceBet::Boxcars => 5,
            DiceBet::Odd => 6,
            DiceBet::Even => 7,
            DiceBet::High => 8,
            DiceBet::Low => 9,
        }
    }

    pub fn target(&self) -> Option<u8> {
        match self {
            DiceBet::Over(t) | DiceBet::Under(t) | DiceBet::Exact(t) => Some(*t),
            _ => None,
        }
    }

    /// Reject targets that can never win or that win on most rolls.
    pub fn validate(&self) -> Result<(), GameError> {
        let valid = match *self {
            DiceBet::Over(t) => (7..=11).contains(&t),
            DiceBet::Under(t) => (3..=7).contains(&t),
            DiceBet::Exact(s) => (2..=12).contains(&s),
            _ => true,
        };
        if valid {
            Ok(())
        } else {
            Err(GameError::InvalidMove)
        }
    }

    /// Number of the 36 rolls this bet wins on.
    pub fn ways(&self) -> u64 {
        (1..=6u8)
            .flat_map(|d1| (1..=6u8).map(move |d2| (d1, d2)))
            .filter(|&(d1, d2)| self.wins(d1, d2))
            .count() as u64
    }

    /// Return multiple in basis points.
    pub fn odds_bps(&self) -> u64 {
        match self {
            DiceBet::Over(_) | DiceBet::Under(_) | DiceBet::Exact(_) => {
                TARGET_RETURN_BPS * OUTCOMES / self.ways().max(1)
            }
            DiceBet::Odd | DiceBet::Even => 20_000,
            DiceBet::Doubles => 50_000,
            DiceBet::SnakeEyes | DiceBet::Boxcars => 350_000,
            DiceBet::High | DiceBet::Low => 22_000,
        }
    }

    pub fn wins(&self, d1: u8, d2: u8) -> bool {
        let sum = d1 + d2;
        match *self {
            DiceBet::Over(t) => sum > t,
            DiceBet::Under(t) => sum < t,
            DiceBet::Exact(s) => sum == s,
            DiceBet::Doubles => d1 == d2,
            DiceBet::SnakeEyes => d1 == 1 && d2 == 1,
            DiceBet::Boxcars => d1 == 6 && d2 == 6,
            DiceBet::Odd => sum % 2 == 1,
            DiceBet::Even => sum % 2 == 0,
            DiceBet::High => sum >= 8,
            DiceBet::Low => sum <= 6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Choose(DiceBet),
    Roll,
    RollLoaded,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiceState {
    pub bet: Option<DiceBet>,
    pub dice: Option<(u8, u8)>,
    /// Extra die shown by a loaded roll.
    pub extra: Option<u8>,
}

pub struct DiceRoll<R = GameRng> {
    rng: R,
    round: Round<DiceState>,
}

impl<R: RandomSource> DiceRoll<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            round: Round::new(GameType::DiceRoll),
        }
    }

    pub fn choose(&mut self, bet: DiceBet) -> Result<GameResult, GameError> {
        let state = self.round.active_state()?;
        bet.validate()?;
        state.bet = Some(bet);
        Ok(GameResult::Continue)
    }

    pub fn roll(&mut self, loaded: bool) -> Result<GameResult, GameError> {
        let choice = self.round.active_state()?.bet.ok_or(GameError::InvalidMove)?;
        let d1 = self.rng.roll_die();
        let d2 = self.rng.roll_die();
        let extra = loaded.then(|| self.rng.roll_die());

        let bet = self.round.bet();
        let state = self.round.active_state()?;
        state.dice = Some((d1, d2));
        state.extra = extra;
        let settlement = if choice.wins(d1, d2) {
            Settlement::win(apply_bps(bet, choice.odds_bps()))
        } else {
            Settlement::loss()
        };
        Ok(self.round.resolve(settlement))
    }
}

impl<R: RandomSource> CasinoGame for DiceRoll<R> {
    type State = DiceState;
    type Move = Move;

    fn round(&self) -> &Round<DiceState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match mv {
            Move::Choose(bet) => self.choose(bet),
            Move::Roll => self.roll(false),
            Move::RollLoaded => self.roll(true),
        }
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        match payload_tag(payload)? {
            0 => Ok(Move::Choose(DiceBet::from_parts(
                payload_arg(payload, 1)?,
                payload.get(2).copied(),
            )?)),
            1 => Ok(Move::Roll),
            2 => Ok(Move::RollLoaded),
            _ => Err(GameError::InvalidPayload),
        }
    }

    fn reset(&mut self) {
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let (d1, d2) = state.dice.unwrap_or((0, 0));
        vec![
            state.bet.map_or(0xFF, |b| b.kind()),
            state.bet.and_then(|b| b.target()).unwrap_or(0),
            d1,
            d2,
            state.extra.is_some() as u8,
        ]
    }

    fn highlight(&self) -> Option<Highlight> {
        let won = self.round.settlement().is_some_and(|s| s.payout > 0);
        let long_odds = matches!(
            self.round.state().bet,
            Some(DiceBet::SnakeEyes) | Some(DiceBet::Boxcars)
        );
        (won && long_odds).then_some(Highlight::Jackpot)
    }
}
