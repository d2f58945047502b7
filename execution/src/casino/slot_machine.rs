//! Slot machine implementation.
//!
//! Three reels, each showing a window of three symbols drawn independently
//! from the theme's weighted table. Only the middle row pays:
//! - three of a kind: bet × multiplier (a jackpot when the multiplier is 100x)
//! - two of a kind: bet × floor(multiplier / 2)
//! - anything else loses
//!
//! Hold & respin: once a grid has been spun, up to two reels can be held
//! before the next spin so they keep their symbols. Engaging the hold costs
//! 2× bet, charged once per round on the first held reel.
//!
//! Details blob format:
//! [theme:u8] [middle0:u8] [middle1:u8] [middle2:u8] [line:u8] [heldMask:u8]
//!
//! Payload format:
//! [0] = Spin
//! [1, reel] = Hold reel (0-2)

use super::{
    payload_arg, payload_tag, select, CasinoGame, GameError, GameResult, GameRng, RandomSource,
    Round, Weighted,
};
use sidebet_types::casino::{GameType, Highlight, Settlement};

pub const REELS: usize = 3;
pub const ROWS: usize = 3;
/// Row that is evaluated.
pub const PAY_ROW: usize = 1;
/// Multiplier at which three of a kind counts as a jackpot.
pub const JACKPOT_MULTIPLIER: u64 = 100;
/// Hold surcharge, in bets.
pub const HOLD_COST_MULTIPLIER: u64 = 2;
pub const MAX_HELD_REELS: usize = 2;

/// Symbol indices, `grid[reel][row]`.
pub type Grid = [[u8; ROWS]; REELS];

/// Reel symbol with its draw weight and three-of-a-kind multiplier
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymbolDef {
    pub name: &'static str,
    pub weight: f64,
    pub multiplier: u64,
}

impl Weighted for SymbolDef {
    fn weight(&self) -> f64 {
        self.weight
    }
}

const fn symbol(name: &'static str, weight: f64, multiplier: u64) -> SymbolDef {
    SymbolDef {
        name,
        weight,
        multiplier,
    }
}

const CLASSIC: [SymbolDef; 7] = [
    symbol("cherry", 30.0, 2),
    symbol("lemon", 25.0, 3),
    symbol("orange", 20.0, 4),
    symbol("bell", 12.0, 8),
    symbol("bar", 8.0, 15),
    symbol("seven", 4.0, 40),
    symbol("diamond", 1.0, 100),
];

const FRUIT: [SymbolDef; 7] = [
    symbol("grape", 32.0, 2),
    symbol("plum", 24.0, 3),
    symbol("melon", 18.0, 5),
    symbol("peach", 13.0, 8),
    symbol("berry", 8.0, 12),
    symbol("pineapple", 4.0, 30),
    symbol("golden-apple", 1.0, 100),
];

const SPACE: [SymbolDef; 7] = [
    symbol("rocket", 30.0, 2),
    symbol("moon", 24.0, 3),
    symbol("star", 19.0, 4),
    symbol("comet", 13.0, 8),
    symbol("planet", 8.0, 15),
    symbol("galaxy", 5.0, 25),
    symbol("black-hole", 1.0, 100),
];

/// Reel theme
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Classic = 0,
    Fruit = 1,
    Space = 2,
}

impl Theme {
    pub fn symbols(&self) -> &'static [SymbolDef; 7] {
        match self {
            Theme::Classic => &CLASSIC,
            Theme::Fruit => &FRUIT,
            Theme::Space => &SPACE,
        }
    }
}

impl TryFrom<u8> for Theme {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Theme::Classic),
            1 => Ok(Theme::Fruit),
            2 => Ok(Theme::Space),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// How the middle row paid
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Miss = 0,
    TwoOfKind = 1,
    ThreeOfKind = 2,
    Jackpot = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Spin,
    Hold(u8),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotState {
    pub theme: Theme,
    /// Grid currently on screen; `None` until the first spin.
    pub grid: Option<Grid>,
    pub held: [bool; REELS],
    pub line: Option<Line>,
}

impl SlotState {
    pub fn middle_row(&self) -> Option<[u8; REELS]> {
        self.grid
            .map(|grid| [grid[0][PAY_ROW], grid[1][PAY_ROW], grid[2][PAY_ROW]])
    }
}

/// Evaluate the pay row. Returns the line and the total payout.
pub fn evaluate(symbols: &[SymbolDef], middle: [u8; REELS], bet: u64) -> (Line, u64) {
    let [a, b, c] = middle;
    let multiplier = |idx: u8| symbols.get(idx as usize).map_or(0, |s| s.multiplier);

    if a == b && b == c {
        let mult = multiplier(a);
        let line = if mult >= JACKPOT_MULTIPLIER {
            Line::Jackpot
        } else {
            Line::ThreeOfKind
        };
        return (line, bet.saturating_mul(mult));
    }

    let pair = if a == b || a == c {
        Some(a)
    } else if b == c {
        Some(b)
    } else {
        None
    };
    match pair {
        Some(idx) => (Line::TwoOfKind, bet.saturating_mul(multiplier(idx) / 2)),
        None => (Line::Miss, 0),
    }
}

pub struct SlotMachine<R = GameRng> {
    rng: R,
    theme: Theme,
    last_grid: Option<Grid>,
    round: Round<SlotState>,
}

impl<R: RandomSource> SlotMachine<R> {
    pub fn new(rng: R) -> Self {
        Self::with_theme(rng, Theme::default())
    }

    pub fn with_theme(rng: R, theme: Theme) -> Self {
        Self {
            rng,
            theme,
            last_grid: None,
            round: Round::new(GameType::SlotMachine),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch theme between spins. The previous grid belongs to the old
    /// theme, so it is dropped and nothing can be held on the next spin.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), GameError> {
        if self.round.is_active() {
            return Err(GameError::RoundInProgress);
        }
        if theme != self.theme {
            self.theme = theme;
            self.last_grid = None;
        }
        Ok(())
    }

    /// Freeze a reel for the coming spin.
    pub fn hold(&mut self, reel: u8) -> Result<GameResult, GameError> {
        let bet = self.round.bet();
        let state = self.round.active_state()?;
        let reel = reel as usize;
        if reel >= REELS || state.grid.is_none() || state.held[reel] {
            return Err(GameError::InvalidMove);
        }
        let held = state.held.iter().filter(|h| **h).count();
        if held >= MAX_HELD_REELS {
            return Err(GameError::InvalidMove);
        }
        state.held[reel] = true;

        if held == 0 {
            Ok(self.round.charge(bet.saturating_mul(HOLD_COST_MULTIPLIER)))
        } else {
            Ok(GameResult::Continue)
        }
    }

    /// Spin every reel that is not held and resolve the round.
    pub fn spin(&mut self) -> Result<GameResult, GameError> {
        let bet = self.round.bet();
        let symbols = self.theme.symbols();
        let state = self.round.active_state()?;

        let mut grid = state.grid.unwrap_or_default();
        for (reel, window) in grid.iter_mut().enumerate() {
            if state.held[reel] {
                continue;
            }
            for cell in window.iter_mut() {
                *cell = select(&mut self.rng, symbols).unwrap_or(0) as u8;
            }
        }

        let middle = [grid[0][PAY_ROW], grid[1][PAY_ROW], grid[2][PAY_ROW]];
        let (line, payout) = evaluate(symbols, middle, bet);
        state.grid = Some(grid);
        state.line = Some(line);
        self.last_grid = Some(grid);

        let settlement = if payout > 0 {
            Settlement::win(payout)
        } else {
            Settlement::loss()
        };
        Ok(self.round.resolve(settlement))
    }
}

impl<R: RandomSource> CasinoGame for SlotMachine<R> {
    type State = SlotState;
    type Move = Move;

    fn round(&self) -> &Round<SlotState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        let state = self.round.begin(bet)?;
        state.theme = self.theme;
        state.grid = self.last_grid;
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match mv {
            Move::Spin => self.spin(),
            Move::Hold(reel) => self.hold(reel),
        }
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        match payload_tag(payload)? {
            0 => Ok(Move::Spin),
            1 => Ok(Move::Hold(payload_arg(payload, 1)?)),
            _ => Err(GameError::InvalidPayload),
        }
    }

    fn reset(&mut self) {
        self.last_grid = None;
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let middle = state.middle_row().unwrap_or_default();
        let held_mask = state
            .held
            .iter()
            .enumerate()
            .fold(0u8, |mask, (i, held)| if *held { mask | (1 << i) } else { mask });
        vec![
            state.theme as u8,
            middle[0],
            middle[1],
            middle[2],
            state.line.unwrap_or(Line::Miss) as u8,
            held_mask,
        ]
    }

    fn highlight(&self) -> Option<Highlight> {
        (self.round.state().line == Some(Line::Jackpot)).then_some(Highlight::Jackpot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_rng, ScriptedRng};
    use sidebet_types::casino::Outcome;

    /// Raw draw that selects `idx` from `symbols`.
    fn draw_for(symbols: &[SymbolDef], idx: usize) -> u32 {
        let total: f64 = symbols.iter().map(|s| s.weight).sum();
        let before: f64 = symbols[..idx].iter().map(|s| s.weight).sum();
        let midpoint = before + symbols[idx].weight / 2.0;
        ScriptedRng::fraction(midpoint / total)
    }

    /// Script a full spin, reel by reel, top to bottom.
    fn script_grid(grid: Grid) -> Vec<u32> {
        grid.iter()
            .flat_map(|window| window.iter().map(|idx| draw_for(&CLASSIC, *idx as usize)))
            .collect()
    }

    #[test]
    fn test_every_theme_has_a_jackpot_symbol() {
        for theme in [Theme::Classic, Theme::Fruit, Theme::Space] {
            let symbols = theme.symbols();
            assert!(symbols.iter().all(|s| s.weight > 0.0 && s.multiplier >= 2));
            assert_eq!(
                symbols.iter().filter(|s| s.multiplier >= JACKPOT_MULTIPLIER).count(),
                1
            );
            // Rarest symbol pays the most
            let rarest = symbols
                .iter()
                .min_by(|a, b| a.weight.total_cmp(&b.weight))
                .unwrap();
            assert_eq!(rarest.multiplier, JACKPOT_MULTIPLIER);
        }
    }

    #[test]
    fn test_evaluate_lines() {
        assert_eq!(evaluate(&CLASSIC, [3, 3, 3], 10), (Line::ThreeOfKind, 80));
        assert_eq!(evaluate(&CLASSIC, [6, 6, 6], 10), (Line::Jackpot, 1_000));
        // Pair in any two positions pays floor(multiplier / 2)
        assert_eq!(evaluate(&CLASSIC, [1, 1, 0], 10), (Line::TwoOfKind, 10));
        assert_eq!(evaluate(&CLASSIC, [4, 0, 4], 10), (Line::TwoOfKind, 70));
        assert_eq!(evaluate(&CLASSIC, [0, 5, 5], 10), (Line::TwoOfKind, 200));
        assert_eq!(evaluate(&CLASSIC, [0, 1, 2], 10), (Line::Miss, 0));
    }

    #[test]
    fn test_spin_jackpot() {
        let grid = [[0, 6, 1], [2, 6, 3], [4, 6, 5]];
        let mut slot = SlotMachine::new(ScriptedRng::new(script_grid(grid)));
        slot.start(5).unwrap();
        let result = slot.spin().unwrap();

        assert_eq!(result, GameResult::Complete(Settlement::win(500)));
        assert_eq!(slot.state().grid, Some(grid));
        assert_eq!(slot.state().line, Some(Line::Jackpot));
        assert_eq!(slot.highlight(), Some(Highlight::Jackpot));
        assert_eq!(slot.details(), vec![0, 6, 6, 6, Line::Jackpot as u8, 0]);
    }

    #[test]
    fn test_spin_miss() {
        let grid = [[0, 0, 0], [1, 1, 1], [2, 2, 2]];
        let mut slot = SlotMachine::new(ScriptedRng::new(script_grid(grid)));
        slot.start(5).unwrap();
        slot.spin().unwrap();
        assert_eq!(slot.end().outcome, Outcome::Loss);
        assert_eq!(slot.end().payout, 0);
        assert_eq!(slot.highlight(), None);
    }

    #[test]
    fn test_hold_and_respin() {
        let first = [[0, 3, 1], [2, 3, 4], [5, 0, 1]];
        let second_third_reel = [2, 3, 2];
        let mut script = script_grid(first);
        script.extend(second_third_reel.iter().map(|idx| draw_for(&CLASSIC, *idx)));

        let mut slot = SlotMachine::new(ScriptedRng::new(script));
        slot.start(10).unwrap();
        slot.spin().unwrap();
        // Pair of bells pays floor(8 / 2) per unit
        assert_eq!(slot.end().payout, 40);

        slot.start(10).unwrap();
        assert_eq!(slot.hold(0), Ok(GameResult::ContinueWithCharge(20)));
        assert_eq!(slot.hold(0), Err(GameError::InvalidMove));
        assert_eq!(slot.hold(1), Ok(GameResult::Continue));
        assert_eq!(slot.hold(2), Err(GameError::InvalidMove));

        slot.spin().unwrap();
        let grid = slot.state().grid.unwrap();
        assert_eq!(grid[0], first[0]);
        assert_eq!(grid[1], first[1]);
        assert_eq!(grid[2], [2, 3, 2]);
        assert_eq!(slot.state().line, Some(Line::ThreeOfKind));
        assert_eq!(slot.end(), Settlement::win(80));

        let record = slot.record().unwrap();
        assert_eq!(record.bet, 30);
        assert_eq!(record.details[5], 0b011);
    }

    #[test]
    fn test_hold_requires_previous_grid() {
        let mut slot = SlotMachine::new(create_rng(1));
        slot.start(10).unwrap();
        assert_eq!(slot.hold(0), Err(GameError::InvalidMove));
        assert_eq!(slot.hold(7), Err(GameError::InvalidMove));
    }

    #[test]
    fn test_theme_switch_only_between_spins() {
        let mut slot = SlotMachine::new(create_rng(2));
        slot.start(10).unwrap();
        assert_eq!(slot.set_theme(Theme::Space), Err(GameError::RoundInProgress));
        slot.spin().unwrap();

        slot.set_theme(Theme::Space).unwrap();
        slot.start(10).unwrap();
        assert_eq!(slot.state().theme, Theme::Space);
        // Old grid was dropped with the old theme
        assert_eq!(slot.state().grid, None);
        assert_eq!(slot.hold(0), Err(GameError::InvalidMove));
    }

    #[test]
    fn test_illegal_transitions() {
        let mut slot = SlotMachine::new(create_rng(3));
        assert_eq!(slot.spin(), Err(GameError::NoActiveRound));
        assert_eq!(slot.start(0), Err(GameError::InvalidBet));
        slot.start(10).unwrap();
        assert_eq!(slot.start(10), Err(GameError::RoundInProgress));
        slot.spin().unwrap();
        assert_eq!(slot.spin(), Err(GameError::GameAlreadyComplete));
    }

    #[test]
    fn test_decode_move() {
        assert_eq!(SlotMachine::<GameRng>::decode_move(&[0]), Ok(Move::Spin));
        assert_eq!(SlotMachine::<GameRng>::decode_move(&[1, 2]), Ok(Move::Hold(2)));
        assert_eq!(
            SlotMachine::<GameRng>::decode_move(&[1]),
            Err(GameError::InvalidPayload)
        );
        assert_eq!(
            SlotMachine::<GameRng>::decode_move(&[9]),
            Err(GameError::InvalidPayload)
        );
    }
}
