use serde::{Deserialize, Serialize};
use sidebet_execution::casino::{mines::Difficulty, scratch_cards::Tier, slot_machine::Theme};
use sidebet_types::casino::{GameType, UnknownGame, STARTING_BALANCE};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

/// Configuration for a [crate::Session], read from YAML.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    pub seed: u64,
    /// Rounds played per game.
    pub rounds: u64,
    #[serde(default = "default_starting_balance")]
    pub starting_balance: u64,
    pub bet: u64,
    #[serde(default = "default_games")]
    pub games: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default)]
    pub table: TableConfig,
}

/// Per-game options.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    pub slot_theme: String,
    pub mine_difficulty: String,
    pub scratch_tier: String,
    pub martingale: bool,
    pub loaded_wheel: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            slot_theme: "classic".to_string(),
            mine_difficulty: "medium".to_string(),
            scratch_tier: "bronze".to_string(),
            martingale: false,
            loaded_wheel: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 0,
            rounds: 100,
            starting_balance: default_starting_balance(),
            bet: 10,
            games: default_games(),
            log_level: default_log_level(),
            json_logs: false,
            table: TableConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    UnknownGame(#[from] UnknownGame),
    #[error("no games selected")]
    NoGames,
    #[error("{field} is invalid: {value}")]
    InvalidOption { field: &'static str, value: String },
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0")]
    InvalidNonZero { field: &'static str },
}

pub struct ValidatedConfig {
    pub seed: u64,
    pub rounds: u64,
    pub starting_balance: u64,
    pub bet: u64,
    pub games: Vec<GameType>,
    pub log_level: Level,
    pub json_logs: bool,

    pub theme: Theme,
    pub difficulty: Difficulty,
    pub tier: Tier,
    pub martingale: bool,
    pub loaded_wheel: bool,
}

fn default_starting_balance() -> u64 {
    STARTING_BALANCE
}

fn default_games() -> Vec<String> {
    GameType::ALL.iter().map(|game| game.name().to_string()).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn parse_option<T: Copy>(
    field: &'static str,
    value: &str,
    options: &[(&str, T)],
) -> Result<T, ConfigError> {
    options
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, option)| *option)
        .ok_or_else(|| ConfigError::InvalidOption {
            field,
            value: value.to_string(),
        })
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        for (field, value) in [
            ("rounds", self.rounds),
            ("bet", self.bet),
            ("starting_balance", self.starting_balance),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidNonZero { field });
            }
        }

        if self.games.is_empty() {
            return Err(ConfigError::NoGames);
        }
        let mut games = Vec::with_capacity(self.games.len());
        for name in &self.games {
            let game = GameType::from_str(name)?;
            if !games.contains(&game) {
                games.push(game);
            }
        }

        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        let table = &self.table;
        let theme = parse_option(
            "slot_theme",
            &table.slot_theme,
            &[
                ("classic", Theme::Classic),
                ("fruit", Theme::Fruit),
                ("space", Theme::Space),
            ],
        )?;
        let difficulty = parse_option(
            "mine_difficulty",
            &table.mine_difficulty,
            &[
                ("easy", Difficulty::Easy),
                ("medium", Difficulty::Medium),
                ("hard", Difficulty::Hard),
            ],
        )?;
        let tier = parse_option(
            "scratch_tier",
            &table.scratch_tier,
            &[
                ("bronze", Tier::Bronze),
                ("silver", Tier::Silver),
                ("gold", Tier::Gold),
                ("diamond", Tier::Diamond),
            ],
        )?;

        Ok(ValidatedConfig {
            seed: self.seed,
            rounds: self.rounds,
            starting_balance: self.starting_balance,
            bet: self.bet,
            games,
            log_level,
            json_logs: self.json_logs,
            theme,
            difficulty,
            tier,
            martingale: table.martingale,
            loaded_wheel: table.loaded_wheel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = Config::from_yaml("seed: 7\nrounds: 3\nbet: 5\n").unwrap();
        assert_eq!(config.starting_balance, STARTING_BALANCE);
        assert_eq!(config.games.len(), 10);
        assert_eq!(config.table, TableConfig::default());

        let validated = config.validate().unwrap();
        assert_eq!(validated.games, GameType::ALL.to_vec());
        assert_eq!(validated.log_level, Level::INFO);
        assert_eq!(validated.theme, Theme::Classic);
        assert_eq!(validated.difficulty, Difficulty::Medium);
        assert_eq!(validated.tier, Tier::Bronze);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
seed: 42
rounds: 50
starting_balance: 5000
bet: 25
games: [coin-flip, mine-sweeper, coin-flip]
log_level: debug
json_logs: true
table:
  slot_theme: Space
  mine_difficulty: hard
  scratch_tier: gold
  martingale: true
"#;
        let validated = Config::from_yaml(yaml).unwrap().validate().unwrap();
        assert_eq!(
            validated.games,
            vec![GameType::CoinFlip, GameType::MineSweeper]
        );
        assert_eq!(validated.log_level, Level::DEBUG);
        assert!(validated.json_logs);
        assert_eq!(validated.theme, Theme::Space);
        assert_eq!(validated.difficulty, Difficulty::Hard);
        assert_eq!(validated.tier, Tier::Gold);
        assert!(validated.martingale);
        assert!(!validated.loaded_wheel);
    }

    #[test]
    fn test_invalid_values() {
        let config = Config {
            games: vec!["roulette".to_string()],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::UnknownGame(_))));

        let config = Config {
            games: vec![],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoGames)));

        let config = Config {
            bet: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNonZero { field: "bet" })
        ));

        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));

        let mut config = Config::default();
        config.table.mine_difficulty = "extreme".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption {
                field: "mine_difficulty",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Config::from_yaml("seed: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
        // Required fields
        assert!(Config::from_yaml("seed: 1\n").is_err());
    }
}
