use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use super::{
    clamp_string, level_for_xp, read_string, string_encode_size, write_string, GameStats,
    MAX_NAME_LENGTH, STARTING_BALANCE,
};

/// Local player profile: balance, progression and lifetime totals
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Player {
    pub name: String,
    pub balance: u64,
    pub xp: u64,
    pub lifetime_wagered: u64,
    /// Coins won back, excluding refunded stakes (pushes).
    pub lifetime_earned: u64,
    pub biggest_win: u64,
    pub stats: GameStats,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self::with_balance(name, STARTING_BALANCE)
    }

    pub fn with_balance(name: &str, balance: u64) -> Self {
        Self {
            name: clamp_string(name, MAX_NAME_LENGTH),
            balance,
            ..Default::default()
        }
    }

    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }
}

impl Write for Player {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.name, writer);
        self.balance.write(writer);
        self.xp.write(writer);
        self.lifetime_wagered.write(writer);
        self.lifetime_earned.write(writer);
        self.biggest_win.write(writer);
        self.stats.write(writer);
    }
}

impl Read for Player {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            name: read_string(reader, MAX_NAME_LENGTH)?,
            balance: u64::read(reader)?,
            xp: u64::read(reader)?,
            lifetime_wagered: u64::read(reader)?,
            lifetime_earned: u64::read(reader)?,
            biggest_win: u64::read(reader)?,
            stats: GameStats::read(reader)?,
        })
    }
}

impl EncodeSize for Player {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.name)
            + self.balance.encode_size()
            + self.xp.encode_size()
            + self.lifetime_wagered.encode_size()
            + self.lifetime_earned.encode_size()
            + self.biggest_win.encode_size()
            + self.stats.encode_size()
    }
}
