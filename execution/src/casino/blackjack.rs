//! Blackjack game implementation.
//!
//! One player hand against the dealer from a single 52-card shoe. The shoe
//! persists across rounds and is reshuffled before a deal once fewer than
//! [`RESHUFFLE_THRESHOLD`] cards remain.
//!
//! Rules:
//! - dealt player, dealer, player, dealer; the dealer's second card is the
//!   hole card and stays hidden until the dealer plays
//! - a hand reaching 21 (including a two-card 21) stands automatically
//! - player bust is an immediate loss
//! - dealer hits below 17 and stands on any 17, soft or hard
//! - win pays 2× bet, equal totals push; a natural pays the same 2×
//!
//! Details blob format:
//! [playerTotal:u8] [dealerTotal:u8]
//! [pLen:u8] [pCards...] [dLen:u8] [dCards...]
//!
//! Payload format:
//! [0] = Hit
//! [1] = Stand

use super::{
    payload_tag, CasinoGame, GameError, GameResult, GameRng, RandomSource, Round, CARD_HIDDEN,
    FALLBACK_CARD,
};
use sidebet_types::casino::{GameType, Highlight, Settlement};
use tracing::{debug, warn};

/// Shoe size below which a new deck is shuffled before the deal.
pub const RESHUFFLE_THRESHOLD: usize = 15;
/// Dealer draws while below this total.
pub const DEALER_STANDS_ON: u8 = 17;
pub const BLACKJACK: u8 = 21;

/// Blackjack move types
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Hit = 0,
    Stand = 1,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Hit),
            1 => Ok(Move::Stand),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// Calculate the value of a blackjack hand.
///
/// Returns the total and whether an ace is still counted as 11.
pub fn hand_value(cards: &[u8]) -> (u8, bool) {
    let mut value: u16 = 0;
    let mut aces: u8 = 0;

    for &card in cards {
        let rank = (card % 13) + 1; // 1=Ace, 2-10, 11=J, 12=Q, 13=K
        if rank == 1 {
            aces += 1;
            value += 11;
        } else if rank >= 10 {
            value += 10;
        } else {
            value += rank as u16;
        }
    }

    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }

    let is_soft = aces > 0 && value <= 21;
    (value.min(255) as u8, is_soft)
}

/// Check if hand is a blackjack (21 with 2 cards).
pub fn is_blackjack(cards: &[u8]) -> bool {
    cards.len() == 2 && hand_value(cards).0 == BLACKJACK
}

/// Observable table. While the round is active the hole card reads as
/// [`CARD_HIDDEN`] and `dealer_total` covers the up card only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlackjackState {
    pub player: Vec<u8>,
    pub dealer: Vec<u8>,
    pub player_total: u8,
    pub dealer_total: u8,
}

pub struct Blackjack<R = GameRng> {
    rng: R,
    /// Undealt cards, drawn from the back.
    shoe: Vec<u8>,
    dealer: Vec<u8>,
    round: Round<BlackjackState>,
}

impl<R: RandomSource> Blackjack<R> {
    pub fn new(rng: R) -> Self {
        Self::with_shoe(rng, Vec::new())
    }

    /// Start from a preset shoe. Cards are drawn from the back.
    pub fn with_shoe(rng: R, shoe: Vec<u8>) -> Self {
        Self {
            rng,
            shoe,
            dealer: Vec::new(),
            round: Round::new(GameType::Blackjack),
        }
    }

    pub fn cards_remaining(&self) -> usize {
        self.shoe.len()
    }

    fn draw(&mut self) -> u8 {
        if let Some(card) = self.shoe.pop() {
            return card;
        }

        // Shoe ran dry mid-round: rebuild from the cards not on the table
        let mut in_play = self.round.state().player.clone();
        in_play.extend_from_slice(&self.dealer);
        self.shoe = self.rng.create_deck_excluding(&in_play);
        debug!(cards = self.shoe.len(), "shoe rebuilt mid-round");
        self.shoe.pop().unwrap_or_else(|| {
            warn!("no cards left to draw, using fallback card");
            FALLBACK_CARD
        })
    }

    fn deal_player(&mut self) -> Result<(), GameError> {
        let card = self.draw();
        self.round.active_state()?.player.push(card);
        Ok(())
    }

    /// Mirror the dealer's hand into the observable state.
    fn sync_dealer(&mut self, reveal: bool) {
        let visible: Vec<u8> = if reveal {
            self.dealer.clone()
        } else {
            self.dealer
                .iter()
                .enumerate()
                .map(|(i, card)| if i == 1 { CARD_HIDDEN } else { *card })
                .collect()
        };
        let dealer_total = if reveal {
            hand_value(&self.dealer).0
        } else {
            hand_value(&self.dealer[..self.dealer.len().min(1)]).0
        };
        if let Ok(state) = self.round.active_state() {
            state.player_total = hand_value(&state.player).0;
            state.dealer = visible;
            state.dealer_total = dealer_total;
        }
    }

    pub fn hit(&mut self) -> Result<GameResult, GameError> {
        self.round.ensure_active()?;
        self.deal_player()?;

        let (total, _) = hand_value(&self.round.state().player);
        if total > BLACKJACK {
            self.sync_dealer(true);
            return Ok(self.round.resolve(Settlement::loss()));
        }
        if total == BLACKJACK {
            return self.stand();
        }
        self.sync_dealer(false);
        Ok(GameResult::Continue)
    }

    /// Stand and let the dealer play out the hand.
    pub fn stand(&mut self) -> Result<GameResult, GameError> {
        self.round.ensure_active()?;

        while hand_value(&self.dealer).0 < DEALER_STANDS_ON {
            let card = self.draw();
            self.dealer.push(card);
        }
        self.sync_dealer(true);

        let bet = self.round.bet();
        let (player, _) = hand_value(&self.round.state().player);
        let (dealer, _) = hand_value(&self.dealer);
        let settlement = if dealer > BLACKJACK || player > dealer {
            Settlement::win(bet.saturating_mul(2))
        } else if player == dealer {
            Settlement::push(bet)
        } else {
            Settlement::loss()
        };
        Ok(self.round.resolve(settlement))
    }
}

impl<R: RandomSource> CasinoGame for Blackjack<R> {
    type State = BlackjackState;
    type Move = Move;

    fn round(&self) -> &Round<BlackjackState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;
        if self.shoe.len() < RESHUFFLE_THRESHOLD {
            self.shoe = self.rng.create_deck();
            debug!(cards = self.shoe.len(), "shoe reshuffled");
        }
        self.dealer.clear();

        self.deal_player()?;
        let up = self.draw();
        self.dealer.push(up);
        self.deal_player()?;
        let hole = self.draw();
        self.dealer.push(hole);

        if hand_value(&self.round.state().player).0 == BLACKJACK {
            return self.stand();
        }
        self.sync_dealer(false);
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match mv {
            Move::Hit => self.hit(),
            Move::Stand => self.stand(),
        }
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        Move::try_from(payload_tag(payload)?)
    }

    fn reset(&mut self) {
        self.shoe.clear();
        self.dealer.clear();
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let mut details = Vec::with_capacity(4 + state.player.len() + state.dealer.len());
        details.push(state.player_total);
        details.push(state.dealer_total);
        details.push(state.player.len() as u8);
        details.extend_from_slice(&state.player);
        details.push(state.dealer.len() as u8);
        details.extend_from_slice(&state.dealer);
        details
    }

    fn highlight(&self) -> Option<Highlight> {
        let won = self.round.settlement().is_some_and(|s| s.payout > self.round.bet());
        (won && is_blackjack(&self.round.state().player)).then_some(Highlight::Natural)
    }
}
