use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use std::{fmt, str::FromStr, time::Duration};
use thiserror::Error as ThisError;

use super::{
    COIN_FLIP_ANIMATION_MS, DEAL_ANIMATION_MS, DERBY_DURATION_MS, DICE_ROLL_ANIMATION_MS,
    MAX_DETAILS_LENGTH, REVEAL_ANIMATION_MS, SLOT_SPIN_ANIMATION_MS, WHEEL_SPIN_ANIMATION_MS,
};

/// Mini-game types, in the order the frontend lists them
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum GameType {
    SlotMachine = 0,
    Blackjack = 1,
    CoinFlip = 2,
    HigherOrLower = 3,
    MineSweeper = 4,
    ScratchCards = 5,
    WheelOfFortune = 6,
    MiniDerby = 7,
    DiceRoll = 8,
    MiniPoker = 9,
}

impl GameType {
    pub const ALL: [GameType; 10] = [
        GameType::SlotMachine,
        GameType::Blackjack,
        GameType::CoinFlip,
        GameType::HigherOrLower,
        GameType::MineSweeper,
        GameType::ScratchCards,
        GameType::WheelOfFortune,
        GameType::MiniDerby,
        GameType::DiceRoll,
        GameType::MiniPoker,
    ];

    /// Stable identifier used in logs and configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            GameType::SlotMachine => "slot-machine",
            GameType::Blackjack => "blackjack",
            GameType::CoinFlip => "coin-flip",
            GameType::HigherOrLower => "higher-or-lower",
            GameType::MineSweeper => "mine-sweeper",
            GameType::ScratchCards => "scratch-cards",
            GameType::WheelOfFortune => "wheel-of-fortune",
            GameType::MiniDerby => "mini-derby",
            GameType::DiceRoll => "dice-roll",
            GameType::MiniPoker => "mini-poker",
        }
    }

    /// Recommended length of the cosmetic animation replayed after a
    /// resolving action.
    pub fn animation(&self) -> Duration {
        let ms = match self {
            GameType::SlotMachine => SLOT_SPIN_ANIMATION_MS,
            GameType::CoinFlip => COIN_FLIP_ANIMATION_MS,
            GameType::DiceRoll => DICE_ROLL_ANIMATION_MS,
            GameType::WheelOfFortune => WHEEL_SPIN_ANIMATION_MS,
            GameType::MiniDerby => DERBY_DURATION_MS,
            GameType::Blackjack | GameType::MiniPoker => DEAL_ANIMATION_MS,
            GameType::HigherOrLower | GameType::MineSweeper | GameType::ScratchCards => {
                REVEAL_ANIMATION_MS
            }
        };
        Duration::from_millis(ms)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unknown game: {0}")]
pub struct UnknownGame(pub String);

impl FromStr for GameType {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameType::ALL
            .into_iter()
            .find(|game| game.name() == s)
            .ok_or_else(|| UnknownGame(s.to_string()))
    }
}

impl Write for GameType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        GameType::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::InvalidEnum(value))
    }
}

impl FixedSize for GameType {
    const SIZE: usize = 1;
}

/// How a round ended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Outcome {
    Win = 0,
    #[default]
    Loss = 1,
    Push = 2,
}

impl Write for Outcome {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Outcome {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Win),
            1 => Ok(Self::Loss),
            2 => Ok(Self::Push),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Outcome {
    const SIZE: usize = 1;
}

/// Final result of a round: the classification and the TOTAL amount returned
/// to the player (stake included). The stake itself was taken at start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    pub outcome: Outcome,
    pub payout: u64,
}

impl Settlement {
    pub fn win(payout: u64) -> Self {
        Self {
            outcome: Outcome::Win,
            payout,
        }
    }

    pub fn loss() -> Self {
        Self::default()
    }

    /// A push returns the stake.
    pub fn push(bet: u64) -> Self {
        Self {
            outcome: Outcome::Push,
            payout: bet,
        }
    }
}

impl Write for Settlement {
    fn write(&self, writer: &mut impl BufMut) {
        self.outcome.write(writer);
        self.payout.write(writer);
    }
}

impl Read for Settlement {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            outcome: Outcome::read(reader)?,
            payout: u64::read(reader)?,
        })
    }
}

impl FixedSize for Settlement {
    const SIZE: usize = Outcome::SIZE + u64::SIZE;
}

/// Notable things that happened in a round, for the achievement collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    /// Top prize of a table (slot jackpot symbol, wheel top segment, best
    /// scratch prize, snake-eyes or boxcars).
    Jackpot,
    /// Two-card 21 in blackjack.
    Natural,
    /// Cashed out a HigherOrLower streak of this length.
    Streak(u8),
    /// Every safe MineSweeper tile revealed.
    BoardCleared,
    /// Exacta hit in MiniDerby.
    Exacta,
    /// The 10x outsider won in MiniDerby.
    LongShot,
    /// Won MiniPoker with a straight flush.
    PerfectHand,
}

impl Write for Highlight {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Jackpot => 0u8.write(writer),
            Self::Natural => 1u8.write(writer),
            Self::Streak(length) => {
                2u8.write(writer);
                length.write(writer);
            }
            Self::BoardCleared => 3u8.write(writer),
            Self::Exacta => 4u8.write(writer),
            Self::LongShot => 5u8.write(writer),
            Self::PerfectHand => 6u8.write(writer),
        }
    }
}

impl Read for Highlight {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Jackpot),
            1 => Ok(Self::Natural),
            2 => Ok(Self::Streak(u8::read(reader)?)),
            3 => Ok(Self::BoardCleared),
            4 => Ok(Self::Exacta),
            5 => Ok(Self::LongShot),
            6 => Ok(Self::PerfectHand),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Highlight {
    fn encode_size(&self) -> usize {
        match self {
            Self::Streak(_) => 2,
            _ => 1,
        }
    }
}

/// Typed event emitted once a round is resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEvent {
    pub game_type: GameType,
    pub outcome: Outcome,
    pub bet: u64,
    pub payout: u64,
    pub highlight: Option<Highlight>,
}

impl Write for GameEvent {
    fn write(&self, writer: &mut impl BufMut) {
        self.game_type.write(writer);
        self.outcome.write(writer);
        self.bet.write(writer);
        self.payout.write(writer);
        self.highlight.write(writer);
    }
}

impl Read for GameEvent {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            game_type: GameType::read(reader)?,
            outcome: Outcome::read(reader)?,
            bet: u64::read(reader)?,
            payout: u64::read(reader)?,
            highlight: Option::<Highlight>::read(reader)?,
        })
    }
}

impl EncodeSize for GameEvent {
    fn encode_size(&self) -> usize {
        self.game_type.encode_size()
            + self.outcome.encode_size()
            + self.bet.encode_size()
            + self.payout.encode_size()
            + self.highlight.encode_size()
    }
}

/// Finalized round, shaped for the history collaborator.
///
/// `details` is a compact game-specific blob; each engine documents its
/// layout in its module header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub game_type: GameType,
    pub bet: u64,
    pub outcome: Outcome,
    pub payout: u64,
    pub details: Vec<u8>,
}

impl OutcomeRecord {
    /// Net change to the player's balance over the whole round.
    pub fn net(&self) -> i128 {
        self.payout as i128 - self.bet as i128
    }

    pub fn settlement(&self) -> Settlement {
        Settlement {
            outcome: self.outcome,
            payout: self.payout,
        }
    }
}

impl Write for OutcomeRecord {
    fn write(&self, writer: &mut impl BufMut) {
        self.game_type.write(writer);
        self.bet.write(writer);
        self.outcome.write(writer);
        self.payout.write(writer);
        self.details.write(writer);
    }
}

impl Read for OutcomeRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            game_type: GameType::read(reader)?,
            bet: u64::read(reader)?,
            outcome: Outcome::read(reader)?,
            payout: u64::read(reader)?,
            details: Vec::<u8>::read_range(reader, 0..=MAX_DETAILS_LENGTH)?,
        })
    }
}

impl EncodeSize for OutcomeRecord {
    fn encode_size(&self) -> usize {
        self.game_type.encode_size()
            + self.bet.encode_size()
            + self.outcome.encode_size()
            + self.payout.encode_size()
            + self.details.encode_size()
    }
}
