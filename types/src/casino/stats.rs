use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};

use super::{GameType, Outcome, OutcomeRecord};

/// Lifetime aggregate for one game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameStat {
    pub game_type: GameType,
    pub rounds: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub wagered: u64,
    pub paid_out: u64,
    pub biggest_payout: u64,
}

impl GameStat {
    fn new(game_type: GameType) -> Self {
        Self {
            game_type,
            rounds: 0,
            wins: 0,
            losses: 0,
            pushes: 0,
            wagered: 0,
            paid_out: 0,
            biggest_payout: 0,
        }
    }

    /// Observed return-to-player in basis points (10_000 = everything back).
    pub fn return_bps(&self) -> Option<u64> {
        if self.wagered == 0 {
            return None;
        }
        Some((self.paid_out as u128 * 10_000 / self.wagered as u128) as u64)
    }
}

impl Write for GameStat {
    fn write(&self, writer: &mut impl BufMut) {
        self.game_type.write(writer);
        self.rounds.write(writer);
        self.wins.write(writer);
        self.losses.write(writer);
        self.pushes.write(writer);
        self.wagered.write(writer);
        self.paid_out.write(writer);
        self.biggest_payout.write(writer);
    }
}

impl Read for GameStat {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            game_type: GameType::read(reader)?,
            rounds: u64::read(reader)?,
            wins: u64::read(reader)?,
            losses: u64::read(reader)?,
            pushes: u64::read(reader)?,
            wagered: u64::read(reader)?,
            paid_out: u64::read(reader)?,
            biggest_payout: u64::read(reader)?,
        })
    }
}

impl EncodeSize for GameStat {
    fn encode_size(&self) -> usize {
        self.game_type.encode_size()
            + self.rounds.encode_size()
            + self.wins.encode_size()
            + self.losses.encode_size()
            + self.pushes.encode_size()
            + self.wagered.encode_size()
            + self.paid_out.encode_size()
            + self.biggest_payout.encode_size()
    }
}

/// Per-game statistics, sorted by game type
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GameStats {
    pub entries: Vec<GameStat>,
}

impl GameStats {
    pub fn update(&mut self, record: &OutcomeRecord) {
        let idx = match self
            .entries
            .binary_search_by(|e| e.game_type.cmp(&record.game_type))
        {
            Ok(idx) => idx,
            Err(idx) => {
                self.entries.insert(idx, GameStat::new(record.game_type));
                idx
            }
        };

        let entry = &mut self.entries[idx];
        entry.rounds += 1;
        match record.outcome {
            Outcome::Win => entry.wins += 1,
            Outcome::Loss => entry.losses += 1,
            Outcome::Push => entry.pushes += 1,
        }
        entry.wagered = entry.wagered.saturating_add(record.bet);
        entry.paid_out = entry.paid_out.saturating_add(record.payout);
        entry.biggest_payout = entry.biggest_payout.max(record.payout);
    }

    pub fn get(&self, game_type: GameType) -> Option<&GameStat> {
        self.entries
            .binary_search_by(|e| e.game_type.cmp(&game_type))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn total_rounds(&self) -> u64 {
        self.entries.iter().map(|e| e.rounds).sum()
    }
}

impl Write for GameStats {
    fn write(&self, writer: &mut impl BufMut) {
        self.entries.write(writer);
    }
}

impl Read for GameStats {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            // At most one entry per game type
            entries: Vec::<GameStat>::read_range(reader, 0..=GameType::ALL.len())?,
        })
    }
}

impl EncodeSize for GameStats {
    fn encode_size(&self) -> usize {
        self.entries.encode_size()
    }
}
