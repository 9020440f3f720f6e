//! Headless Hexhold runner.
//!
//! Drives AI-vs-AI games for balance tuning: `run` plays one seed and
//! logs the game as it unfolds, `batch` sweeps a seed range and prints
//! aggregate metrics as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use hexhold_core::selfplay::{run_batch_selfplay, run_selfplay, SelfPlayConfig};
use hexhold_core::Tuning;
use hexhold_protocol::{WinCondition, WinKind};

#[derive(Parser)]
#[command(name = "hexhold", version, about = "Hexhold selfplay runner")]
struct Cli {
    /// Tuning file (YAML); defaults are used when absent.
    #[arg(long, global = true)]
    tuning: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game and log its course.
    Run {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 2)]
        opponents: u8,
        /// "wealth" or "domination".
        #[arg(long, default_value = "wealth")]
        win: String,
        #[arg(long, default_value_t = 500)]
        target: u64,
        #[arg(long, default_value_t = 5_000)]
        max_ticks: u64,
    },
    /// Sweep consecutive seeds and print aggregate metrics as JSON.
    Batch {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 20)]
        games: u32,
        #[arg(long, default_value_t = 2)]
        opponents: u8,
        #[arg(long, default_value = "wealth")]
        win: String,
        #[arg(long, default_value_t = 500)]
        target: u64,
        #[arg(long, default_value_t = 5_000)]
        max_ticks: u64,
    },
}

fn parse_win_kind(s: &str) -> anyhow::Result<WinKind> {
    match s {
        "wealth" => Ok(WinKind::Wealth),
        "domination" => Ok(WinKind::Domination),
        other => anyhow::bail!("unknown win kind {other:?} (expected wealth or domination)"),
    }
}

fn load_tuning(path: Option<&PathBuf>) -> anyhow::Result<Tuning> {
    match path {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display())),
        None => Ok(Tuning::default()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hexhold=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let tuning = load_tuning(cli.tuning.as_ref())?;

    match cli.command {
        Commands::Run {
            seed,
            opponents,
            win,
            target,
            max_ticks,
        } => {
            let config = SelfPlayConfig {
                win: WinCondition {
                    kind: parse_win_kind(&win)?,
                    target,
                    opponents,
                },
                seed,
                max_ticks,
                tuning,
            };
            info!(seed, opponents, target, "starting selfplay game");
            let result = run_selfplay(&config);
            info!(
                ticks = result.ticks_played,
                tiles = result.tiles_discovered,
                "game over"
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Batch {
            seed,
            games,
            opponents,
            win,
            target,
            max_ticks,
        } => {
            let config = SelfPlayConfig {
                win: WinCondition {
                    kind: parse_win_kind(&win)?,
                    target,
                    opponents,
                },
                seed,
                max_ticks,
                tuning,
            };
            info!(games, base_seed = seed, "starting selfplay batch");
            let metrics = run_batch_selfplay(&config, games);
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }
    Ok(())
}
