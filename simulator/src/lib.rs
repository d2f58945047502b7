//! Headless session runner.
//!
//! A [Session] plays every configured game for a number of rounds with the
//! players in [strategy], taking stakes from an in-memory [Player] wallet and
//! settling each resolved round back into it.

use sidebet_execution::casino::{
    coin_flip::CoinFlip, mines::MineSweeper, scratch_cards::ScratchCards,
    slot_machine::SlotMachine, Arcade, GameError, GameResult, GameRng,
};
use sidebet_types::casino::{
    settle_round, GameEvent, GameType, Ledger, LedgerError, OutcomeRecord, Player,
};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod config;
pub mod strategy;

pub use config::{Config, ConfigError, TableConfig, ValidatedConfig};

/// Upper bound on moves in a single round.
pub const MAX_MOVES: usize = 64;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{game} rejected a move: {source}")]
    Game {
        game: GameType,
        #[source]
        source: GameError,
    },
    #[error("{game} requested a charge the wallet cannot cover: {source}")]
    Charge {
        game: GameType,
        #[source]
        source: LedgerError,
    },
    #[error("{game} did not settle within the move limit")]
    Stalled { game: GameType },
}

/// Summary of a finished session.
#[derive(Clone, Debug)]
pub struct Report {
    pub player: Player,
    pub rounds: u64,
    /// Set when the wallet could not cover a stake.
    pub busted: bool,
    /// Events that carried a highlight, in play order.
    pub highlights: Vec<GameEvent>,
}

pub struct Session {
    config: ValidatedConfig,
    player: Player,
    strategy: GameRng,
    highlights: Vec<GameEvent>,
}

impl Session {
    pub fn new(config: ValidatedConfig) -> Self {
        let player = Player::with_balance("simulator", config.starting_balance);
        let strategy = GameRng::new(b"strategy", config.seed);
        Self {
            config,
            player,
            strategy,
            highlights: Vec::new(),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Open a configured engine. Each game draws from its own stream.
    pub fn open(&self, game_type: GameType) -> Result<Arcade, SessionError> {
        let rng = GameRng::new(&self.config.seed.to_be_bytes(), game_type as u64);
        let arcade = match game_type {
            GameType::SlotMachine => SlotMachine::with_theme(rng, self.config.theme).into(),
            GameType::MineSweeper => {
                MineSweeper::with_difficulty(rng, self.config.difficulty).into()
            }
            GameType::ScratchCards => ScratchCards::with_tier(rng, self.config.tier).into(),
            GameType::CoinFlip => {
                let mut game = CoinFlip::new(rng);
                game.set_martingale(self.config.martingale)
                    .map_err(|source| SessionError::Game {
                        game: game_type,
                        source,
                    })?;
                game.into()
            }
            _ => Arcade::new(game_type, rng),
        };
        Ok(arcade)
    }

    /// Stake for the next round.
    fn stake(&self, arcade: &Arcade) -> u64 {
        match arcade {
            Arcade::CoinFlip(game) => game.next_bet().unwrap_or(self.config.bet),
            _ => self.config.bet,
        }
    }

    /// Play one round. Returns `None` without touching the engine when the
    /// wallet cannot cover the stake.
    pub fn play_round(
        &mut self,
        arcade: &mut Arcade,
    ) -> Result<Option<OutcomeRecord>, SessionError> {
        let game = arcade.game_type();
        let stake = self.stake(arcade);
        if let Err(err) = self.player.debit(stake) {
            warn!(%game, stake, %err, "stake not covered");
            return Ok(None);
        }

        let mut result = arcade
            .start(stake)
            .map_err(|source| SessionError::Game { game, source })?;
        for _ in 0..MAX_MOVES {
            match result {
                GameResult::Complete(_) => return self.settle(arcade).map(Some),
                GameResult::ContinueWithCharge(amount) => {
                    self.player
                        .debit(amount)
                        .map_err(|source| SessionError::Charge { game, source })?;
                }
                GameResult::Continue => {}
            }
            let table = strategy::Table {
                balance: self.player.balance,
                loaded_wheel: self.config.loaded_wheel,
            };
            let payload = strategy::next_move(arcade, table, &mut self.strategy);
            result = arcade
                .process_move(&payload)
                .map_err(|source| SessionError::Game { game, source })?;
        }
        if result.is_complete() {
            return self.settle(arcade).map(Some);
        }
        Err(SessionError::Stalled { game })
    }

    fn settle(&mut self, arcade: &Arcade) -> Result<OutcomeRecord, SessionError> {
        let game = arcade.game_type();
        let record = arcade.record().ok_or(SessionError::Stalled { game })?;
        settle_round(&mut self.player, &record);
        debug!(
            %game,
            bet = record.bet,
            outcome = ?record.outcome,
            payout = record.payout,
            balance = self.player.balance,
            "round settled"
        );
        if let Some(event) = arcade.event().filter(|event| event.highlight.is_some()) {
            info!(%game, highlight = ?event.highlight, payout = event.payout, "highlight");
            self.highlights.push(event);
        }
        Ok(record)
    }

    /// Play every configured game in turn.
    pub fn run(mut self) -> Result<Report, SessionError> {
        let mut rounds = 0;
        let mut busted = false;
        let games = self.config.games.clone();
        'games: for game_type in games {
            let mut arcade = self.open(game_type)?;
            info!(game = %game_type, rounds = self.config.rounds, "playing");
            for _ in 0..self.config.rounds {
                if self.play_round(&mut arcade)?.is_none() {
                    busted = true;
                    break 'games;
                }
                rounds += 1;
            }
        }
        info!(
            rounds,
            busted,
            balance = self.player.balance,
            level = self.player.level(),
            "session finished"
        );
        Ok(Report {
            player: self.player,
            rounds,
            busted,
            highlights: self.highlights,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<18} {:>7} {:>6} {:>6} {:>6} {:>10} {:>10} {:>8}",
            "game", "rounds", "wins", "losses", "pushes", "wagered", "paid", "return"
        )?;
        for game_type in GameType::ALL {
            let Some(stat) = self.player.stats.get(game_type) else {
                continue;
            };
            let rtp = stat
                .return_bps()
                .map(|bps| format!("{}.{:02}%", bps / 100, bps % 100))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:<18} {:>7} {:>6} {:>6} {:>6} {:>10} {:>10} {:>8}",
                game_type.name(),
                stat.rounds,
                stat.wins,
                stat.losses,
                stat.pushes,
                stat.wagered,
                stat.paid_out,
                rtp
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "rounds: {}  balance: {}  level: {}  highlights: {}{}",
            self.rounds,
            self.player.balance,
            self.player.level(),
            self.highlights.len(),
            if self.busted { "  (out of funds)" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidebet_execution::casino::CasinoGame;

    fn config(games: &[&str], rounds: u64) -> ValidatedConfig {
        Config {
            seed: 9,
            rounds,
            starting_balance: 100_000,
            bet: 10,
            games: games.iter().map(|g| g.to_string()).collect(),
            ..Config::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_session_plays_every_game() {
        let names: Vec<&str> = GameType::ALL.iter().map(|game| game.name()).collect();
        let session = Session::new(config(&names, 25));
        let report = session.run().unwrap();
        assert!(!report.busted);
        assert_eq!(report.rounds, 250);
        assert_eq!(report.player.stats.total_rounds(), 250);
        for game in GameType::ALL {
            assert_eq!(report.player.stats.get(game).unwrap().rounds, 25);
        }
        let text = report.to_string();
        assert!(text.contains("mini-derby"));
        assert!(text.contains("rounds: 250"));
    }

    #[test]
    fn test_wallet_balances() {
        let mut session = Session::new(config(&["slot-machine"], 40));
        let mut arcade = session.open(GameType::SlotMachine).unwrap();
        for _ in 0..40 {
            let before = session.player().balance;
            let record = session.play_round(&mut arcade).unwrap().unwrap();
            assert_eq!(
                session.player().balance as i128,
                before as i128 + record.net()
            );
        }
        let stat = session.player().stats.get(GameType::SlotMachine).unwrap();
        assert_eq!(stat.wagered, session.player().lifetime_wagered);
    }

    #[test]
    fn test_session_is_deterministic() {
        let a = Session::new(config(&["blackjack", "mini-derby"], 30)).run().unwrap();
        let b = Session::new(config(&["blackjack", "mini-derby"], 30)).run().unwrap();
        assert_eq!(a.player, b.player);
        assert_eq!(a.highlights, b.highlights);
    }

    #[test]
    fn test_busts_when_stake_not_covered() {
        let mut validated = config(&["coin-flip", "dice-roll"], 10);
        validated.starting_balance = 5;
        let report = Session::new(validated).run().unwrap();
        assert!(report.busted);
        assert_eq!(report.rounds, 0);
        assert_eq!(report.player.balance, 5);
        assert_eq!(report.player.lifetime_wagered, 0);
        assert!(report.to_string().contains("out of funds"));
    }

    #[test]
    fn test_configured_engines() {
        let mut validated = config(&["coin-flip"], 1);
        validated.martingale = true;
        validated.tier = sidebet_execution::casino::scratch_cards::Tier::Gold;
        let session = Session::new(validated);

        match session.open(GameType::CoinFlip).unwrap() {
            Arcade::CoinFlip(game) => assert!(game.martingale()),
            _ => panic!("expected coin flip"),
        }
        match session.open(GameType::ScratchCards).unwrap() {
            Arcade::ScratchCards(mut game) => {
                game.start(100).unwrap();
                assert_eq!(
                    game.state().tier,
                    sidebet_execution::casino::scratch_cards::Tier::Gold
                );
            }
            _ => panic!("expected scratch cards"),
        }
    }
}
