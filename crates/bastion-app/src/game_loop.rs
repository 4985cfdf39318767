//! Game loop thread. Runs the simulation engine at 60Hz and publishes snapshots.
//!
//! The engine is created inside this thread because it's cleaner for ownership.
//! Commands arrive via `mpsc` channel. Snapshots are stored in shared state
//! for polling, and the events they carry are forwarded to the log.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use bastion_core::commands::PlayerCommand;
use bastion_core::config::GameConfig;
use bastion_core::constants::TICK_RATE;
use bastion_core::enums::GamePhase;
use bastion_core::events::SimEvent;
use bastion_core::state::GameStateSnapshot;
use bastion_sim::engine::SimulationEngine;

use crate::state::GameLoopCommand;

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// How a loop should run.
#[derive(Debug, Clone, Default)]
pub struct LoopOptions {
    pub config: GameConfig,
    /// Stop after this many ticks. `None` runs until shutdown or defeat.
    pub max_ticks: Option<u64>,
    /// Pace ticks against the wall clock. Off runs as fast as possible.
    pub realtime: bool,
}

/// Spawns the game loop in a new thread and starts a game in it.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    options: LoopOptions,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("bastion-game-loop".into())
        .spawn(move || {
            run_game_loop(options, cmd_rx, &latest_snapshot);
        })?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown, channel disconnect, defeat or the
/// tick limit.
fn run_game_loop(
    options: LoopOptions,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    let mut engine = SimulationEngine::new(options.config);
    engine.queue_command(PlayerCommand::StartGame);
    let mut next_tick_time = Instant::now();
    let mut ticks = 0u64;

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => {
                    engine.queue_command(cmd);
                }
                Ok(GameLoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick();
        ticks += 1;

        // 3. Forward events
        log_events(&snapshot.events);
        let defeated = snapshot.phase == GamePhase::Defeated;

        // 4. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if defeated || options.max_ticks.is_some_and(|max| ticks >= max) {
            tracing::info!(ticks, defeated, "game loop finished");
            return;
        }

        if !options.realtime {
            continue;
        }

        // 5. Sleep until next tick
        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind, reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }
}

/// Run a game to completion on the current thread and return the final
/// snapshot. `commands` are queued before the first tick.
pub fn run_headless(
    config: GameConfig,
    ticks: u64,
    commands: impl IntoIterator<Item = PlayerCommand>,
) -> GameStateSnapshot {
    let mut engine = SimulationEngine::new(config);
    engine.queue_command(PlayerCommand::StartGame);
    engine.queue_commands(commands);

    let mut snapshot = engine.tick();
    log_events(&snapshot.events);
    for _ in 1..ticks {
        if snapshot.phase == GamePhase::Defeated {
            break;
        }
        snapshot = engine.tick();
        log_events(&snapshot.events);
    }
    snapshot
}

fn log_events(events: &[SimEvent]) {
    for event in events {
        match event {
            SimEvent::NightStarted { .. }
            | SimEvent::DayStarted { .. }
            | SimEvent::WaveSpawned { .. }
            | SimEvent::Defeated { .. } => tracing::info!(?event, "sim event"),
            _ => tracing::debug!(?event, "sim event"),
        }
    }
}
