//! Simple players for every game.
//!
//! Each strategy looks at the observable state and returns the next wire
//! payload. They never peek at hidden information.

use sidebet_execution::casino::{
    mines::{Tile, BOARD_SIZE},
    mini_poker::{evaluate_hand, HandRank},
    slot_machine::{HOLD_COST_MULTIPLIER, REELS},
    Arcade, CasinoGame, GameRng, RandomSource,
};

/// Blackjack players hit below this total.
pub const HIT_BELOW: u8 = 17;
/// HigherOrLower players cash out at this streak.
pub const CASH_OUT_STREAK: u32 = 3;
/// MineSweeper players cash out after this many safe tiles.
pub const MINES_TARGET: u8 = 3;

/// Knobs a strategy may use besides the game state.
#[derive(Clone, Copy, Debug)]
pub struct Table {
    /// Coins the player can still spend on extra charges.
    pub balance: u64,
    pub loaded_wheel: bool,
}

/// Next payload for the round in progress.
pub fn next_move(arcade: &Arcade, table: Table, rng: &mut GameRng) -> Vec<u8> {
    match arcade {
        Arcade::SlotMachine(game) => {
            let state = game.state();
            let cost = game.round().bet().saturating_mul(HOLD_COST_MULTIPLIER);
            let holding = state.held.iter().any(|held| *held);
            // Hold a random reel on a quarter of the rounds that can afford it
            if state.grid.is_some() && !holding && table.balance >= cost && rng.next_bounded(4) == 0
            {
                vec![1, rng.next_bounded(REELS as u32) as u8]
            } else {
                vec![0]
            }
        }
        Arcade::Blackjack(game) => {
            if game.state().player_total < HIT_BELOW {
                vec![0]
            } else {
                vec![1]
            }
        }
        Arcade::CoinFlip(_) => vec![rng.next_bounded(2) as u8],
        Arcade::HigherOrLower(game) => {
            let state = game.state();
            if state.streak >= CASH_OUT_STREAK {
                vec![2]
            } else if state.current <= 7 {
                vec![0]
            } else {
                vec![1]
            }
        }
        Arcade::MineSweeper(game) => {
            let state = game.state();
            if state.revealed >= MINES_TARGET {
                return vec![2];
            }
            if state.revealed == 0 && state.lucky_left > 0 {
                return vec![1];
            }
            let hidden: Vec<usize> = (0..state.tiles.len())
                .filter(|&idx| state.tiles[idx] == Tile::Hidden)
                .collect();
            if hidden.is_empty() {
                return vec![2];
            }
            let idx = hidden[rng.next_bounded(hidden.len() as u32) as usize] as u8;
            vec![0, idx / BOARD_SIZE, idx % BOARD_SIZE]
        }
        Arcade::ScratchCards(_) => vec![1],
        Arcade::WheelOfFortune(game) => {
            if table.loaded_wheel && !game.loaded() {
                vec![1]
            } else {
                vec![0]
            }
        }
        Arcade::MiniDerby(game) => match game.state().bet {
            None => vec![0, rng.next_bounded(4) as u8],
            Some(_) => vec![2],
        },
        Arcade::DiceRoll(game) => match game.state().bet {
            // Over 7, doubles or even
            None => match rng.next_bounded(3) {
                0 => vec![0, 0, 7],
                1 => vec![0, 3],
                _ => vec![0, 7],
            },
            Some(_) => vec![1],
        },
        Arcade::MiniPoker(game) => {
            if evaluate_hand(&game.state().player) == HandRank::HighCard {
                vec![1]
            } else {
                vec![0]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidebet_execution::casino::GameResult;
    use sidebet_types::casino::GameType;

    const TABLE: Table = Table {
        balance: 1_000,
        loaded_wheel: false,
    };

    fn finish(arcade: &mut Arcade, table: Table, rng: &mut GameRng) -> usize {
        let mut moves = 0;
        let mut result = arcade.start(10).unwrap();
        while !result.is_complete() {
            let payload = next_move(arcade, table, rng);
            result = arcade.process_move(&payload).unwrap();
            moves += 1;
            assert!(moves < 64);
        }
        moves
    }

    #[test]
    fn test_strategies_always_legal() {
        let mut rng = GameRng::from_seed(11);
        for (session, game_type) in GameType::ALL.into_iter().enumerate() {
            let mut arcade = Arcade::new(game_type, GameRng::from_seed(session as u64));
            for _ in 0..50 {
                finish(&mut arcade, TABLE, &mut rng);
            }
        }
    }

    #[test]
    fn test_loaded_wheel_loads_first() {
        let mut rng = GameRng::from_seed(1);
        let table = Table {
            loaded_wheel: true,
            ..TABLE
        };
        let mut arcade = Arcade::new(GameType::WheelOfFortune, GameRng::from_seed(2));
        arcade.start(10).unwrap();
        assert_eq!(next_move(&arcade, table, &mut rng), vec![1]);
        assert_eq!(arcade.process_move(&[1]), Ok(GameResult::Continue));
        assert_eq!(next_move(&arcade, table, &mut rng), vec![0]);
    }

    #[test]
    fn test_slot_never_holds_unaffordable() {
        let mut rng = GameRng::from_seed(3);
        let broke = Table {
            balance: 0,
            ..TABLE
        };
        let mut arcade = Arcade::new(GameType::SlotMachine, GameRng::from_seed(4));
        for _ in 0..50 {
            assert_eq!(finish(&mut arcade, broke, &mut rng), 1);
        }
    }
}
