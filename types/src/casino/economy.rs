//! The economy collaborator.
//!
//! Game engines never touch balances. The caller takes the stake with
//! [`Ledger::debit`] before `start`, then forwards the settlement of a
//! resolved round through [`settle_round`].

use thiserror::Error;

use super::{Outcome, OutcomeRecord, Player, XP_PER_LEVEL, XP_PER_ROUND, XP_PER_WIN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance: have {balance}, need {amount}")]
    InsufficientFunds { balance: u64, amount: u64 },
    #[error("amount must be positive")]
    ZeroAmount,
}

/// Balance, progression and history sink consumed by the engines' caller.
pub trait Ledger {
    /// Take `amount` from the balance. Fails without side effects when the
    /// balance does not cover it.
    fn debit(&mut self, amount: u64) -> Result<(), LedgerError>;

    /// Add `amount` to the balance. `counts_as_earned` is false for refunded
    /// stakes, which must not inflate lifetime winnings.
    fn credit(&mut self, amount: u64, counts_as_earned: bool);

    fn grant_xp(&mut self, amount: u64);

    fn record_outcome(&mut self, record: &OutcomeRecord);
}

/// XP granted for a resolved round.
pub fn xp_for(outcome: Outcome) -> u64 {
    match outcome {
        Outcome::Win => XP_PER_ROUND + XP_PER_WIN,
        Outcome::Loss | Outcome::Push => XP_PER_ROUND,
    }
}

pub fn level_for_xp(xp: u64) -> u32 {
    let level = 1 + xp / XP_PER_LEVEL;
    level.min(u32::MAX as u64) as u32
}

/// Forward a resolved round to the ledger: pay out, grant XP, record history.
pub fn settle_round(ledger: &mut impl Ledger, record: &OutcomeRecord) {
    if record.payout > 0 {
        ledger.credit(record.payout, record.outcome != Outcome::Push);
    }
    ledger.grant_xp(xp_for(record.outcome));
    ledger.record_outcome(record);
}

impl Ledger for Player {
    fn debit(&mut self, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                balance: self.balance,
                amount,
            });
        }
        self.balance -= amount;
        self.lifetime_wagered = self.lifetime_wagered.saturating_add(amount);
        Ok(())
    }

    fn credit(&mut self, amount: u64, counts_as_earned: bool) {
        self.balance = self.balance.saturating_add(amount);
        if counts_as_earned {
            self.lifetime_earned = self.lifetime_earned.saturating_add(amount);
            self.biggest_win = self.biggest_win.max(amount);
        }
    }

    fn grant_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
    }

    fn record_outcome(&mut self, record: &OutcomeRecord) {
        self.stats.update(record);
    }
}
