//! Mini derby implementation.
//!
//! Four racers with fixed odds run a race simulated on a fixed tick. Each
//! tick moves every racer still running forward by its base speed scaled by
//! uniform ±15% noise. Racers that reach the line join the finish order in
//! the tick they cross it; racers sharing a tick are ordered by how early in
//! the tick they crossed. When time runs out the rest follow by distance
//! covered.
//!
//! Base speed falls with the log of the odds, scaled by `SPEED_EDGE`. Each
//! racer wins a little less often than its odds would repay.
//!
//! Bets:
//! - win: the pick finishes first, pays bet × odds
//! - exacta: two distinct picks finish first and second in order, pays 30×
//!
//! Every tick is stored in [`DerbyState::frames`] so the race can be replayed.
//!
//! Details blob format:
//! [betKind:u8] [pick1:u8] [pick2:u8] [finish:u8 × 4] [ticks:u8]
//!
//! Payload format:
//! [0, racer] = Bet on the winner
//! [1, first, second] = Bet on an exacta
//! [2] = Run the race

use super::{
    payload_arg, payload_tag, CasinoGame, GameError, GameResult, GameRng, RandomSource, Round,
};
use sidebet_types::casino::{GameType, Highlight, Settlement, DERBY_DURATION_MS, DERBY_TICK_MS};
use tracing::debug;

pub const RACERS: usize = 4;
/// Race length, in percent of the track.
pub const FINISH_LINE: f64 = 100.0;
pub const TICKS: usize = (DERBY_DURATION_MS / DERBY_TICK_MS) as usize;
/// Track covered per tick at base speed 1.0, in percent.
const TICK_PROGRESS: f64 = 1.25;
const SPEED_EDGE: f64 = 0.007;
/// Noise amplitude around the base speed.
const NOISE: f64 = 0.15;
pub const EXACTA_MULTIPLIER: u64 = 30;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Racer {
    pub name: &'static str,
    pub odds: u64,
}

impl Racer {
    /// Distance covered per tick before noise.
    pub fn base_speed(&self) -> f64 {
        TICK_PROGRESS * (1.0 - SPEED_EDGE * (self.odds as f64).ln())
    }
}

pub const FIELD: [Racer; RACERS] = [
    Racer {
        name: "Thunderhoof",
        odds: 2,
    },
    Racer {
        name: "Copper Kettle",
        odds: 3,
    },
    Racer {
        name: "Night Owl",
        odds: 5,
    },
    Racer {
        name: "Lucky Clover",
        odds: 10,
    },
];

/// Racer paid as a long shot.
const LONG_SHOT: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bet {
    Win(u8),
    Exacta(u8, u8),
}

impl Bet {
    fn validate(&self) -> Result<(), GameError> {
        let valid = |r: u8| (r as usize) < RACERS;
        match *self {
            Bet::Win(r) if valid(r) => Ok(()),
            Bet::Exacta(a, b) if valid(a) && valid(b) && a != b => Ok(()),
            _ => Err(GameError::InvalidMove),
        }
    }

    /// Total return for a finish order, zero when the bet lost.
    pub fn payout(&self, bet: u64, order: &[u8]) -> u64 {
        match *self {
            Bet::Win(r) if order.first() == Some(&r) => {
                bet.saturating_mul(FIELD[r as usize].odds)
            }
            Bet::Exacta(a, b) if order.starts_with(&[a, b]) => {
                bet.saturating_mul(EXACTA_MULTIPLIER)
            }
            _ => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Place(Bet),
    Run,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerbyState {
    pub bet: Option<Bet>,
    /// Racer ids, winner first. Filled once the race has run.
    pub finish: Vec<u8>,
    /// Progress of each racer after every tick.
    pub frames: Vec<[f64; RACERS]>,
}

/// Simulate a race. Returns the finish order and the per-tick frames.
pub fn run_race<R: RandomSource>(rng: &mut R) -> (Vec<u8>, Vec<[f64; RACERS]>) {
    let mut progress = [0.0f64; RACERS];
    let mut finish: Vec<u8> = Vec::with_capacity(RACERS);
    let mut frames = Vec::with_capacity(TICKS);

    for _ in 0..TICKS {
        if finish.len() == RACERS {
            break;
        }
        let mut crossed: Vec<(f64, u8)> = Vec::new();
        for (id, racer) in FIELD.iter().enumerate() {
            if progress[id] >= FINISH_LINE {
                continue;
            }
            let noise = 1.0 + (rng.next_f64() * 2.0 - 1.0) * NOISE;
            let stride = racer.base_speed() * noise;
            let reached = progress[id] + stride;
            if reached >= FINISH_LINE {
                // Share of the stride left past the line: larger crossed earlier
                crossed.push(((reached - FINISH_LINE) / stride, id as u8));
            }
            progress[id] = reached.min(FINISH_LINE);
        }
        // Stable: an exact tie keeps lane order
        crossed.sort_by(|a, b| b.0.total_cmp(&a.0));
        finish.extend(crossed.into_iter().map(|(_, id)| id));
        frames.push(progress);
    }

    // Time is up: the rest follow by distance covered
    let mut rest: Vec<u8> = (0..RACERS as u8).filter(|id| !finish.contains(id)).collect();
    rest.sort_by(|a, b| progress[*b as usize].total_cmp(&progress[*a as usize]));
    finish.extend(rest);
    (finish, frames)
}

pub struct MiniDerby<R = GameRng> {
    rng: R,
    round: Round<DerbyState>,
}

impl<R: RandomSource> MiniDerby<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            round: Round::new(GameType::MiniDerby),
        }
    }

    /// Choose (or change) the bet before the race.
    pub fn place(&mut self, bet: Bet) -> Result<GameResult, GameError> {
        let state = self.round.active_state()?;
        bet.validate()?;
        state.bet = Some(bet);
        Ok(GameResult::Continue)
    }

    pub fn run(&mut self) -> Result<GameResult, GameError> {
        let bet = self.round.active_state()?.bet.ok_or(GameError::InvalidMove)?;
        let (finish, frames) = run_race(&mut self.rng);
        debug!(?finish, ticks = frames.len(), "race finished");

        let payout = bet.payout(self.round.bet(), &finish);
        let state = self.round.active_state()?;
        state.finish = finish;
        state.frames = frames;
        let settlement = if payout > 0 {
            Settlement::win(payout)
        } else {
            Settlement::loss()
        };
        Ok(self.round.resolve(settlement))
    }
}

impl<R: RandomSource> CasinoGame for MiniDerby<R> {
    type State = DerbyState;
    type Move = Move;

    fn round(&self) -> &Round<DerbyState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match mv {
            Move::Place(bet) => self.place(bet),
            Move::Run => self.run(),
        }
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        match payload_tag(payload)? {
            0 => Ok(Move::Place(Bet::Win(payload_arg(payload, 1)?))),
            1 => Ok(Move::Place(Bet::Exacta(
                payload_arg(payload, 1)?,
                payload_arg(payload, 2)?,
            ))),
            2 => Ok(Move::Run),
            _ => Err(GameError::InvalidPayload),
        }
    }

    fn reset(&mut self) {
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let (kind, first, second) = match state.bet {
            Some(Bet::Win(r)) => (0, r, 0xFF),
            Some(Bet::Exacta(a, b)) => (1, a, b),
            None => (0xFF, 0xFF, 0xFF),
        };
        let mut details = vec![kind, first, second];
        details.extend_from_slice(&state.finish);
        details.push(state.frames.len().min(u8::MAX as usize) as u8);
        details
    }

    fn highlight(&self) -> Option<Highlight> {
        if !self.round.settlement().is_some_and(|s| s.payout > 0) {
            return None;
        }
        match self.round.state().bet? {
            Bet::Exacta(..) => Some(Highlight::Exacta),
            Bet::Win(LONG_SHOT) => Some(Highlight::LongShot),
            Bet::Win(_) => None,
        }
    }
}
