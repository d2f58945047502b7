//! Mini poker implementation.
//!
//! Three cards each to player and dealer from a freshly shuffled deck. The
//! dealer's cards stay face down until the player plays or folds.
//!
//! Folding forfeits the bet. Playing compares hand categories only: the
//! better category wins and equal categories push. A win returns
//! bet × [`payout_multiplier`] of the player's category.
//!
//! Details blob format:
//! [p1:u8] [p2:u8] [p3:u8] [d1:u8] [d2:u8] [d3:u8]
//! [playerRank:u8] [dealerRank:u8] [decision:u8]
//!
//! Payload format:
//! [0] = Play
//! [1] = Fold

use super::{
    payload_tag, CasinoGame, GameError, GameResult, GameRng, RandomSource, Round, CARD_HIDDEN,
    FALLBACK_CARD,
};
use sidebet_types::casino::{GameType, Highlight, Settlement};
use std::cmp::Ordering;

/// Mini poker move types
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Play = 0,
    Fold = 1,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Play),
            1 => Ok(Move::Fold),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// Three card hand rankings (higher is better).
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandRank {
    HighCard = 0,
    Pair = 1,
    Flush = 2,
    Straight = 3,
    ThreeOfAKind = 4,
    StraightFlush = 5,
}

/// Return multiple of the bet for a winning hand.
pub fn payout_multiplier(rank: HandRank) -> u64 {
    match rank {
        HandRank::HighCard => 2,
        HandRank::Pair => 3,
        HandRank::Flush => 4,
        HandRank::Straight => 6,
        HandRank::ThreeOfAKind => 10,
        HandRank::StraightFlush => 15,
    }
}

/// Get card rank (2-14, Ace = 14 for comparison).
fn card_rank(card: u8) -> u8 {
    let r = (card % 13) + 1;
    if r == 1 {
        14
    } else {
        r
    }
}

/// Get card suit.
fn card_suit(card: u8) -> u8 {
    card / 13
}

/// Evaluate a 3-card hand.
pub fn evaluate_hand(cards: &[u8; 3]) -> HandRank {
    let mut ranks = cards.map(card_rank);
    ranks.sort_unstable();

    let is_flush = cards.iter().all(|&c| card_suit(c) == card_suit(cards[0]));
    // Ace plays high (Q-K-A) or low (A-2-3)
    let is_straight =
        (ranks[1] == ranks[0] + 1 && ranks[2] == ranks[1] + 1) || ranks == [2, 3, 14];
    let is_trips = ranks[0] == ranks[2];
    let is_pair = ranks[0] == ranks[1] || ranks[1] == ranks[2];

    if is_straight && is_flush {
        HandRank::StraightFlush
    } else if is_trips {
        HandRank::ThreeOfAKind
    } else if is_straight {
        HandRank::Straight
    } else if is_flush {
        HandRank::Flush
    } else if is_pair {
        HandRank::Pair
    } else {
        HandRank::HighCard
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MiniPokerState {
    pub player: [u8; 3],
    /// Face down ([`CARD_HIDDEN`]) until the round resolves.
    pub dealer: [u8; 3],
    pub player_rank: Option<HandRank>,
    pub dealer_rank: Option<HandRank>,
    pub folded: bool,
}

pub struct MiniPoker<R = GameRng> {
    rng: R,
    dealer: [u8; 3],
    round: Round<MiniPokerState>,
}

impl<R: RandomSource> MiniPoker<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            dealer: [CARD_HIDDEN; 3],
            round: Round::new(GameType::MiniPoker),
        }
    }

    fn showdown(&mut self, folded: bool) -> Result<GameResult, GameError> {
        let bet = self.round.bet();
        let dealer = self.dealer;
        let state = self.round.active_state()?;
        state.dealer = dealer;
        state.folded = folded;
        let dealer_rank = evaluate_hand(&dealer);
        state.dealer_rank = Some(dealer_rank);
        let player_rank = evaluate_hand(&state.player);

        let settlement = if folded {
            Settlement::loss()
        } else {
            match player_rank.cmp(&dealer_rank) {
                Ordering::Greater => {
                    Settlement::win(bet.saturating_mul(payout_multiplier(player_rank)))
                }
                Ordering::Equal => Settlement::push(bet),
                Ordering::Less => Settlement::loss(),
            }
        };
        Ok(self.round.resolve(settlement))
    }
}

impl<R: RandomSource> CasinoGame for MiniPoker<R> {
    type State = MiniPokerState;
    type Move = Move;

    fn round(&self) -> &Round<MiniPokerState> {
        &self.round
    }

    fn start(&mut self, bet: u64) -> Result<GameResult, GameError> {
        self.round.begin(bet)?;
        let mut deck = self.rng.create_deck();
        let mut deal = || deck.pop().unwrap_or(FALLBACK_CARD);
        let player = [deal(), deal(), deal()];
        self.dealer = [deal(), deal(), deal()];

        let state = self.round.active_state()?;
        state.player = player;
        state.dealer = [CARD_HIDDEN; 3];
        state.player_rank = Some(evaluate_hand(&player));
        Ok(GameResult::Continue)
    }

    fn play(&mut self, mv: Move) -> Result<GameResult, GameError> {
        self.showdown(mv == Move::Fold)
    }

    fn decode_move(payload: &[u8]) -> Result<Move, GameError> {
        Move::try_from(payload_tag(payload)?)
    }

    fn reset(&mut self) {
        self.dealer = [CARD_HIDDEN; 3];
        self.round.reset();
    }

    fn details(&self) -> Vec<u8> {
        let state = self.round.state();
        let rank = |r: Option<HandRank>| r.map_or(0xFF, |r| r as u8);
        let mut details = Vec::with_capacity(9);
        details.extend_from_slice(&state.player);
        details.extend_from_slice(&state.dealer);
        details.push(rank(state.player_rank));
        details.push(rank(state.dealer_rank));
        details.push(state.folded as u8);
        details
    }

    fn highlight(&self) -> Option<Highlight> {
        let state = self.round.state();
        let won = self.round.settlement().is_some_and(|s| s.payout > self.round.bet());
        let perfect = state.player_rank == Some(HandRank::StraightFlush);
        (won && perfect).then_some(Highlight::PerfectHand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_rng;
    use sidebet_types::casino::Outcome;

    // Suit offsets
    const S: u8 = 0;
    const H: u8 = 13;
    const D: u8 = 26;
    const C: u8 = 39;

    /// Card from a 1-13 rank (ace = 1) and suit offset.
    fn card(rank: u8, suit: u8) -> u8 {
        suit + rank - 1
    }

    /// Start a round and stack both hands.
    fn stacked(player: [u8; 3], dealer: [u8; 3]) -> MiniPoker<GameRng> {
        let mut game = MiniPoker::new(create_rng(1));
        game.start(10).unwrap();
        game.dealer = dealer;
        let state = game.round.active_state().unwrap();
        state.player = player;
        state.player_rank = Some(evaluate_hand(&player));
        game
    }

    #[test]
    fn test_evaluate_hand() {
        let hand = |cards: [u8; 3]| evaluate_hand(&cards);
        assert_eq!(hand([card(2, S), card(7, H), card(11, D)]), HandRank::HighCard);
        assert_eq!(hand([card(9, S), card(9, H), card(4, C)]), HandRank::Pair);
        assert_eq!(hand([card(2, S), card(8, S), card(12, S)]), HandRank::Flush);
        assert_eq!(hand([card(4, S), card(5, H), card(6, D)]), HandRank::Straight);
        assert_eq!(hand([card(1, S), card(2, H), card(3, D)]), HandRank::Straight);
        assert_eq!(hand([card(12, S), card(13, H), card(1, D)]), HandRank::Straight);
        // No wrap-around
        assert_eq!(hand([card(13, S), card(1, H), card(2, D)]), HandRank::HighCard);
        assert_eq!(hand([card(7, S), card(7, H), card(7, D)]), HandRank::ThreeOfAKind);
        assert_eq!(hand([card(9, C), card(10, C), card(11, C)]), HandRank::StraightFlush);
    }

    #[test]
    fn test_rank_ordering() {
        assert!(HandRank::HighCard < HandRank::Pair);
        assert!(HandRank::Pair < HandRank::Flush);
        assert!(HandRank::Flush < HandRank::Straight);
        assert!(HandRank::Straight < HandRank::ThreeOfAKind);
        assert!(HandRank::ThreeOfAKind < HandRank::StraightFlush);
    }

    #[test]
    fn test_deal_hides_dealer() {
        let mut game = MiniPoker::new(create_rng(3));
        game.start(10).unwrap();
        let state = game.state();
        assert_eq!(state.dealer, [CARD_HIDDEN; 3]);
        assert!(state.player.iter().all(|c| *c < 52));
        assert!(!state.player.contains(&game.dealer[0]));
        assert_eq!(state.dealer_rank, None);
    }

    #[test]
    fn test_better_rank_wins() {
        let mut game = stacked(
            [card(5, S), card(5, H), card(9, D)],
            [card(2, S), card(7, H), card(11, D)],
        );
        let result = game.play(Move::Play).unwrap();
        assert_eq!(result, GameResult::Complete(Settlement::win(30)));
        assert_eq!(game.state().dealer_rank, Some(HandRank::HighCard));
        assert_eq!(game.highlight(), None);
    }

    #[test]
    fn test_equal_rank_pushes() {
        // Kicker does not matter
        let mut game = stacked(
            [card(2, S), card(2, H), card(3, D)],
            [card(1, S), card(1, H), card(13, D)],
        );
        game.play(Move::Play).unwrap();
        assert_eq!(game.end(), Settlement::push(10));
    }

    #[test]
    fn test_worse_rank_loses() {
        let mut game = stacked(
            [card(2, S), card(9, S), card(5, S)],
            [card(4, S), card(5, H), card(6, D)],
        );
        game.play(Move::Play).unwrap();
        assert_eq!(game.end().outcome, Outcome::Loss);
        assert_eq!(game.end().payout, 0);
    }

    #[test]
    fn test_fold_reveals_and_loses() {
        let mut game = stacked(
            [card(9, C), card(10, C), card(11, C)],
            [card(2, S), card(7, H), card(11, D)],
        );
        game.play(Move::Fold).unwrap();
        assert_eq!(game.end(), Settlement::loss());
        assert_eq!(game.state().dealer, game.dealer);
        assert_eq!(game.details()[8], 1);
    }

    #[test]
    fn test_straight_flush_is_perfect_hand() {
        let mut game = stacked(
            [card(9, C), card(10, C), card(11, C)],
            [card(7, S), card(7, H), card(7, D)],
        );
        game.play(Move::Play).unwrap();
        assert_eq!(game.end(), Settlement::win(150));
        assert_eq!(game.highlight(), Some(Highlight::PerfectHand));
        assert_eq!(game.play(Move::Play), Err(GameError::GameAlreadyComplete));
    }
}
