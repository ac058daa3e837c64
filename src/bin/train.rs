use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hexapawn::checkpoint::TableStore;
use hexapawn::config::AppConfig;
use hexapawn::training::Trainer;

/// Train the Hexapawn agents via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train the Hexapawn Q-learning agents by self-play")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "hexapawn.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Seed both agents for a reproducible run (at most i64::MAX)
    #[arg(long, value_parser = clap::value_parser!(u64).range(..=i64::MAX as u64))]
    seed: Option<u64>,

    /// Override the directory holding the value tables
    #[arg(long)]
    table_dir: Option<PathBuf>,

    /// Delete the learned tables before training
    #[arg(long)]
    reset: bool,

    /// Override the number of evaluation games against a random player
    #[arg(long)]
    eval_games: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    if let Some(seed) = cli.seed {
        app_config.training.seed = Some(seed);
    }
    if let Some(dir) = cli.table_dir {
        app_config.store.table_dir = dir;
    }
    if let Some(games) = cli.eval_games {
        app_config.training.eval_games = games;
    }
    app_config.validate().context("validating configuration")?;

    let store = TableStore::new(app_config.store.clone());
    let trainer = Trainer::new(app_config.training.clone(), app_config.agent.clone(), store);

    if cli.reset {
        let removed = trainer.reset_learning().context("resetting learned tables")?;
        println!("Reset: removed {removed} table(s)");
    }

    trainer.train().context("self-play training")?;
    Ok(())
}
