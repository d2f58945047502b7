//! Round lifecycle shared by every engine.

use super::{GameError, GameResult};
use sidebet_types::casino::{GameType, Settlement};
use tracing::debug;

/// Where a round is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Resolved,
}

/// One round of a game: the bet, the observable state and, once resolved,
/// the settlement.
#[derive(Clone, Debug)]
pub struct Round<S> {
    game_type: GameType,
    phase: Phase,
    bet: u64,
    /// Extra stake taken mid-round.
    charged: u64,
    settlement: Option<Settlement>,
    state: S,
}

impl<S: Default> Round<S> {
    pub fn new(game_type: GameType) -> Self {
        Self {
            game_type,
            phase: Phase::Idle,
            bet: 0,
            charged: 0,
            settlement: None,
            state: S::default(),
        }
    }

    /// Record the bet and move to `Active` with a fresh state.
    ///
    /// Legal from `Idle` and `Resolved`; the latter discards the previous
    /// settlement.
    pub fn begin(&mut self, bet: u64) -> Result<&mut S, GameError> {
        if bet == 0 {
            return Err(GameError::InvalidBet);
        }
        if self.phase == Phase::Active {
            return Err(GameError::RoundInProgress);
        }
        self.phase = Phase::Active;
        self.bet = bet;
        self.charged = 0;
        self.settlement = None;
        self.state = S::default();
        debug!(game = %self.game_type, bet, "round started");
        Ok(&mut self.state)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.game_type);
    }
}

impl<S> Round<S> {
    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Stake placed at `start`.
    pub fn bet(&self) -> u64 {
        self.bet
    }

    /// Total stake of the round, including mid-round charges.
    pub fn wagered(&self) -> u64 {
        self.bet.saturating_add(self.charged)
    }

    pub fn settlement(&self) -> Option<Settlement> {
        self.settlement
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn ensure_active(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Idle => Err(GameError::NoActiveRound),
            Phase::Resolved => Err(GameError::GameAlreadyComplete),
        }
    }

    /// Mutable state of the running round.
    pub fn active_state(&mut self) -> Result<&mut S, GameError> {
        self.ensure_active()?;
        Ok(&mut self.state)
    }

    /// Take an additional stake during the round.
    pub fn charge(&mut self, amount: u64) -> GameResult {
        self.charged = self.charged.saturating_add(amount);
        debug!(game = %self.game_type, amount, "extra stake charged");
        GameResult::ContinueWithCharge(amount)
    }

    /// Terminal transition. Must be called exactly once per round.
    pub fn resolve(&mut self, settlement: Settlement) -> GameResult {
        debug_assert!(self.phase == Phase::Active);
        self.phase = Phase::Resolved;
        self.settlement = Some(settlement);
        debug!(
            game = %self.game_type,
            bet = self.wagered(),
            outcome = ?settlement.outcome,
            payout = settlement.payout,
            "round resolved"
        );
        GameResult::Complete(settlement)
    }
}
