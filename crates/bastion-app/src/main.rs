//! Headless BASTION runner.
//!
//! Plays a session without a front end and prints a summary of the final
//! state. Useful for balancing and for checking that a seed replays.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use bastion_app::game_loop::{self, LoopOptions};
use bastion_app::state::AppState;
use bastion_core::config::GameConfig;
use bastion_core::enums::GamePhase;
use bastion_core::state::GameStateSnapshot;

/// Headless BASTION runner
#[derive(Parser, Debug)]
#[command(name = "bastion")]
#[command(about = "Run a BASTION session headless and report how the settlement fared")]
struct Args {
    /// JSON config file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Day length in milliseconds (night is half as long)
    #[arg(long)]
    day_duration_ms: Option<f64>,

    /// Ticks to simulate (60 ticks per simulated second)
    #[arg(long, default_value_t = 60 * 60 * 10)]
    ticks: u64,

    /// Pace the game loop thread against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Print the full final snapshot instead of the summary
    #[arg(long)]
    full: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    elapsed_ms: f64,
    phase: GamePhase,
    day_count: u32,
    coins: u32,
    villagers: usize,
    enemies: usize,
    structures: usize,
}

impl RunSummary {
    fn new(seed: u64, snapshot: &GameStateSnapshot) -> Self {
        Self {
            seed,
            ticks: snapshot.time.tick,
            elapsed_ms: snapshot.time.elapsed_ms,
            phase: snapshot.phase,
            day_count: snapshot.clock.day_count,
            coins: snapshot.coins,
            villagers: snapshot.villagers.len(),
            enemies: snapshot.enemies.len(),
            structures: snapshot.structures.len(),
        }
    }
}

fn load_config(args: &Args) -> Result<GameConfig, bastion_core::error::ConfigError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(day) = args.day_duration_ms {
        config.day_duration_ms = day;
    }
    config.validate()?;
    Ok(config)
}

fn run_threaded(config: GameConfig, ticks: u64) -> Option<GameStateSnapshot> {
    let state = AppState::new();
    let options = LoopOptions {
        config,
        max_ticks: Some(ticks),
        realtime: true,
    };
    let handle = match state.start(options) {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(%err, "failed to spawn game loop thread");
            return None;
        }
    };
    state.finish(handle)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "could not load config");
            return ExitCode::FAILURE;
        }
    };
    let seed = config.seed;
    tracing::info!(seed, ticks = args.ticks, realtime = args.realtime, "starting session");

    let snapshot = if args.realtime {
        match run_threaded(config, args.ticks) {
            Some(snapshot) => snapshot,
            None => return ExitCode::FAILURE,
        }
    } else {
        game_loop::run_headless(config, args.ticks, [])
    };

    let json = if args.full {
        serde_json::to_string_pretty(&snapshot)
    } else {
        serde_json::to_string_pretty(&RunSummary::new(seed, &snapshot))
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "failed to serialize result");
            ExitCode::FAILURE
        }
    }
}
