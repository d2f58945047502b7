use anyhow::Context;
use clap::Parser;
use sidebet_simulator::{Config, Session};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML session file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Play only these games (repeatable), e.g. `--game coin-flip`.
    #[arg(short, long)]
    game: Vec<String>,

    /// Rounds per game.
    #[arg(short, long)]
    rounds: Option<u64>,

    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long)]
    bet: Option<u64>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if !self.game.is_empty() {
            config.games = self.game;
        }
        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(bet) = self.bet {
            config.bet = bet;
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let mut config = match &args.config {
        Some(path) => {
            let file = std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            Config::from_yaml(&file).with_context(|| format!("could not load {}", path.display()))?
        }
        None => Config::default(),
    };
    args.apply(&mut config);
    let config = config.validate().context("invalid configuration")?;

    // Create logger
    let logger = tracing_subscriber::fmt().with_max_level(config.log_level);
    if config.json_logs {
        logger.json().init();
    } else {
        logger.init();
    }
    info!(seed = config.seed, games = config.games.len(), "starting session");

    // Run
    let report = Session::new(config).run().context("session failed")?;
    println!("{report}");
    Ok(())
}
