//! Dispatch over every game behind one type.
//!
//! Callers that hold "whichever game is open" (the simulator, a frontend
//! bridge) drive an [`Arcade`] with raw payloads; each engine documents its
//! own payload format.

use super::{
    blackjack::Blackjack, coin_flip::CoinFlip, derby::MiniDerby, dice::DiceRoll,
    hilo::HigherOrLower, mines::MineSweeper, mini_poker::MiniPoker, scratch_cards::ScratchCards,
    slot_machine::SlotMachine, wheel::WheelOfFortune, CasinoGame, GameError, GameResult, GameRng,
    Phase, RandomSource,
};
use sidebet_types::casino::{GameEvent, GameType, OutcomeRecord, Settlement};

pub enum Arcade<R = GameRng> {
    SlotMachine(SlotMachine<R>),
    Blackjack(Blackjack<R>),
    CoinFlip(CoinFlip<R>),
    HigherOrLower(HigherOrLower<R>),
    MineSweeper(MineSweeper<R>),
    ScratchCards(ScratchCards<R>),
    WheelOfFortune(WheelOfFortune<R>),
    MiniDerby(MiniDerby<R>),
    DiceRoll(DiceRoll<R>),
    MiniPoker(MiniPoker<R>),
}

macro_rules! dispatch {
    ($self:expr, $game:ident => $body:expr) => {
        match $self {
            Arcade::SlotMachine($game) => $body,
            Arcade::Blackjack($game) => $body,
            Arcade::CoinFlip($game) => $body,
            Arcade::HigherOrLower($game) => $body,
            Arcade::MineSweeper($game) => $body,
            Arcade::ScratchCards($game) => $body,
            Arcade::WheelOfFortune($game) => $body,
            Arcade::MiniDerby($game) => $body,
            Arcade::DiceRoll($game) => $body,
            Arcade::MiniPoker($game) => $body,
        }
    };
}

impl<R: RandomSource> Arcade<R> {
    /// Open a game with default configuration.
    pub fn new(game_type: GameType, rng: R) -> Self {
        match game_type {
            GameType::SlotMachine => SlotMachine::new(rng).into(),
            GameType::Blackjack => Blackjack::new(rng).into(),
            GameType::CoinFlip => CoinFlip::new(rng).into(),
            GameType::HigherOrLower => HigherOrLower::new(rng).into(),
            GameType::MineSweeper => MineSweeper::new(rng).into(),
            GameType::ScratchCards => ScratchCards::new(rng).into(),
            GameType::WheelOfFortune => WheelOfFortune::new(rng).into(),
            GameType::MiniDerby => MiniDerby::new(rng).into(),
            GameType::DiceRoll => DiceRoll::new(rng).into(),
            GameType::MiniPoker => MiniPoker::new(rng).into(),
        }
    }

    pub fn game_type(&self) -> GameType {
        dispatch!(self, game => game.game_type())
    }

    pub fn phase(&self) -> Phase {
        dispatch!(self, game => game.round().phase())
    }

    pub fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        dispatch!(self, game => game.start(bet))
    }

    pub fn process_move(&mut self, payload: &[u8]) -> Result<GameResult, GameError> {
        dispatch!(self, game => game.process_move(payload))
    }

    pub fn end(&self) -> Settlement {
        dispatch!(self, game => game.end())
    }

    pub fn record(&self) -> Option<OutcomeRecord> {
        dispatch!(self, game => game.record())
    }

    pub fn event(&self) -> Option<GameEvent> {
        dispatch!(self, game => game.event())
    }

    pub fn reset(&mut self) {
        dispatch!(self, game => game.reset())
    }
}

macro_rules! impl_from {
    ($($variant:ident),*) => {
        $(
            impl<R> From<$variant<R>> for Arcade<R> {
                fn from(game: $variant<R>) -> Self {
                    Arcade::$variant(game)
                }
            }
        )*
    };
}

impl_from!(
    SlotMachine,
    Blackjack,
    CoinFlip,
    HigherOrLower,
    MineSweeper,
    ScratchCards,
    WheelOfFortune,
    MiniDerby,
    DiceRoll,
    MiniPoker
);
