//! Wheel of fortune implementation.
//!
//! One spin lands on a weighted segment of [`SEGMENTS`]. Bankrupt loses;
//! every other segment wins, paying either its flat coin value or
//! bet × multiplier.
//!
//! A loaded wheel takes bankrupt out of the draw for the next spin only.
//!
//! Details blob format:
//! [segment:u8] [loaded:u8]
//!
//! Payload format:
//! [0] = Spin
//! [1] = Load the wheel for this spin

use super::{
    apply_bps, payload_tag, select, CasinoGame, GameError, GameResult, GameRng, RandomSource,
    Round, Weighted,
};
use sidebet_types::casino::{GameType, Highlight, Settlement};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prize {
    /// Flat coin prize.
    Coins(u64),
    /// Multiple of the bet, in basis points.
    Multiplier(u64),
    Bankrupt,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub prize: Prize,
    pub weight: f64,
}

impl Weighted for Segment {
    fn weight(&self) -> f64 {
        self.weight
    }
}

const fn segment(prize: Prize, weight: f64) -> Segment {
    Segment { prize, weight }
}

/// Segments in wheel order.
pub const SEGMENTS: [Segment; 10] = [
    segment(Prize::Coins(10), 20.0),
    segment(Prize::Multiplier(15_000), 18.0),
    segment(Prize::Coins(25), 15.0),
    segment(Prize::Multiplier(20_000), 14.0),
    segment(Prize::Bankrupt, 8.0),
    segment(Prize::Coins(50), 10.0),
    segment(Prize::Multiplier(30_000), 6.0),
    segment(Prize::Coins(100), 5.0),
    segment(Prize::Multiplier(50_000), 3.0),
    segment(Prize::Multiplier(100_000), 1.0),
];

/// Index of the top segment.
pub const JACKPOT_SEGMENT: usize = 9;

/// Weights of a loaded wheel: bankrupt is weighted out.
fn loaded_weights() -> [f64; SEGMENTS.len()] {
    SEGMENTS.map(|s| match s.prize {
        Prize::Bankrupt => 0.0,
        _ => s.weight,
    })
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Spin = 0,
    Load = 1,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Spin),
            1 => Ok(Move::Load),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WheelState {
    pub segment: Option<usize>,
    /// Whether the spin ran without bankrupt.
    pub loaded: bool,
}

pub struct WheelOfFortune<R = GameRng> {
    rng: R,
    loaded: bool,
    round: Round<WheelState>,
}

impl<R: RandomSource> WheelOfFortune<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            loaded: false,
            round: Round::new(GameType::WheelOfFortune),
        }
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Load or unload the wheel for the next spin, between rounds.
    pub fn set_loaded(&mut self, loaded: bool) -> Result<(), GameError> {
        if self.round.is_active() {
            return Err(GameError::RoundInProgress);
        }
        self.loaded = loaded;
        Ok(())
    }

    /// Load the wheel for the spin of the running round.
    pub fn load(&mut self) -> Result<GameResult, GameError> {
        self.round.ensure_active()?;
        if self.loaded {
            return Err(GameError::InvalidMove);
        }
        self.loaded = true;
        Ok(GameResult::Continue)
    }

    pub fn spin(&mut self) -> Result<GameResult, GameError> {
        self.round.ensure_active()?;
        let loaded = std::mem::take(&mut self.loaded);
        let index = if loaded {
            select(&mut self.rng, &loaded_weights())
        } else {
            select(&mut self.rng, &SEGMENTS)
        }
        .unwrap_or(0);
        debug!(index, loaded, "wheel stopped");

        let bet = self.round.bet();
        let state = self.round.active_state()?;
        state.segment = Some(index);
        state.loaded = loaded;
        let settlement = match SEGMENTS[index].prize {
            Prize::Coins(value) => Settlement::win(value),
            Prize::Multiplier(bps) => Settlement::win(apply_bps(bet, bps)),
            Prize::Bankrupt => Settlement::loss(),
        };
        Ok(self.round.resolve(settlement))
    }
}

impl<R: RandomSource> CasinoGame for WheelOfFortune<R> {
    type State = WheelState;
    type Move = Move;

    fn round(&self) -> &Round<WheelState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match mv {
            Move::Spin => self.spin(),
            Move::Load => self.load(),
        }
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        Move::try_from(payload_tag(payload)?)
    }

    /// Also drops a pending load.
    fn reset(&mut self) {
        self.loaded = false;
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        vec![
            state.segment.map_or(0xFF, |s| s as u8),
            state.loaded as u8,
        ]
    }

    fn highlight(&self) -> Option<Highlight> {
        (self.round.state().segment == Some(JACKPOT_SEGMENT)).then_some(Highlight::Jackpot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_rng, ScriptedRng};
    use sidebet_types::casino::Outcome;

    const BANKRUPT: usize = 4;

    /// Raw draw that lands on `idx` of the unloaded wheel.
    fn land_on(idx: usize) -> u32 {
        let total: f64 = SEGMENTS.iter().map(|s| s.weight).sum();
        let before: f64 = SEGMENTS[..idx].iter().map(|s| s.weight).sum();
        ScriptedRng::fraction((before + SEGMENTS[idx].weight / 2.0) / total)
    }

    #[test]
    fn test_table_shape() {
        assert_eq!(SEGMENTS[BANKRUPT].prize, Prize::Bankrupt);
        assert_eq!(SEGMENTS[JACKPOT_SEGMENT].prize, Prize::Multiplier(100_000));
        assert!(SEGMENTS.iter().all(|s| s.weight > 0.0));
    }

    #[test]
    fn test_flat_and_multiplier_segments() {
        let mut wheel = WheelOfFortune::new(ScriptedRng::new([land_on(2), land_on(3)]));
        wheel.start(40).unwrap();
        assert_eq!(wheel.spin(), Ok(GameResult::Complete(Settlement::win(25))));

        wheel.start(40).unwrap();
        assert_eq!(wheel.spin(), Ok(GameResult::Complete(Settlement::win(80))));
        assert_eq!(wheel.details(), vec![3, 0]);
    }

    #[test]
    fn test_bankrupt_loses() {
        let mut wheel = WheelOfFortune::new(ScriptedRng::new([land_on(BANKRUPT)]));
        wheel.start(40).unwrap();
        wheel.play(Move::Spin).unwrap();
        assert_eq!(wheel.end(), Settlement::loss());
        assert_eq!(wheel.state().segment, Some(BANKRUPT));
    }

    #[test]
    fn test_jackpot_segment() {
        let mut wheel = WheelOfFortune::new(ScriptedRng::new([land_on(JACKPOT_SEGMENT)]));
        wheel.start(7).unwrap();
        wheel.spin().unwrap();
        assert_eq!(wheel.end(), Settlement::win(70));
        assert_eq!(wheel.highlight(), Some(Highlight::Jackpot));
    }

    #[test]
    fn test_loaded_wheel_never_bankrupts() {
        let mut wheel = WheelOfFortune::new(create_rng(3));
        for _ in 0..2_000 {
            wheel.start(10).unwrap();
            wheel.play(Move::Load).unwrap();
            assert_eq!(wheel.load(), Err(GameError::InvalidMove));
            wheel.play(Move::Spin).unwrap();
            assert_eq!(wheel.end().outcome, Outcome::Win);
            assert!(wheel.state().loaded);
        }
    }

    #[test]
    fn test_load_lasts_one_spin() {
        let mut wheel = WheelOfFortune::new(create_rng(4));
        wheel.set_loaded(true).unwrap();
        wheel.start(10).unwrap();
        assert_eq!(wheel.set_loaded(false), Err(GameError::RoundInProgress));
        wheel.spin().unwrap();
        assert!(wheel.state().loaded);
        assert!(!wheel.loaded());

        let mut bankrupts = 0;
        for _ in 0..2_000 {
            wheel.start(10).unwrap();
            wheel.spin().unwrap();
            if wheel.state().segment == Some(BANKRUPT) {
                bankrupts += 1;
            }
        }
        assert!(bankrupts > 0);
    }
}
