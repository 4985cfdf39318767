//! Application state shared between the caller and the game loop thread.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use bastion_core::commands::PlayerCommand;
use bastion_core::state::GameStateSnapshot;

use crate::game_loop::{self, LoopOptions};

/// Commands sent from the front end to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Handles a front end keeps on the running game loop.
///
/// - `command_tx` sits in a `Mutex` because `mpsc::Sender` is not `Sync`.
/// - `latest_snapshot` is shared with the loop thread, which overwrites it
///   after every tick.
pub struct AppState {
    /// `None` until the loop has been spawned.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    pub latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    pub running: Mutex<bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            running: Mutex::new(false),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the game loop thread unless one is already running.
    pub fn start(&self, options: LoopOptions) -> io::Result<JoinHandle<()>> {
        let mut running = self.running.lock().map_err(|e| io::Error::other(e.to_string()))?;
        if *running {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "game loop already running",
            ));
        }

        let (tx, handle) = game_loop::spawn_game_loop(options, Arc::clone(&self.latest_snapshot))?;
        let mut tx_lock = self.command_tx.lock().map_err(|e| io::Error::other(e.to_string()))?;
        *tx_lock = Some(tx);
        *running = true;
        Ok(handle)
    }

    /// Wait for a started loop to exit and return its last snapshot.
    /// Returns `None` if the thread panicked or never produced a tick.
    pub fn finish(&self, handle: JoinHandle<()>) -> Option<GameStateSnapshot> {
        let joined = handle.join();
        if let Ok(mut tx) = self.command_tx.lock() {
            *tx = None;
        }
        if let Ok(mut running) = self.running.lock() {
            *running = false;
        }
        if joined.is_err() {
            tracing::error!("game loop thread panicked");
            return None;
        }
        self.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().map(|running| *running).unwrap_or(false)
    }

    /// Forward a player command to the loop. Returns `false` if no loop is
    /// running or it has already exited.
    pub fn send_command(&self, command: PlayerCommand) -> bool {
        self.send(GameLoopCommand::PlayerCommand(command))
    }

    /// Ask the loop to stop after its current tick.
    pub fn shutdown(&self) -> bool {
        self.send(GameLoopCommand::Shutdown)
    }

    /// Copy of the most recent snapshot, if the loop has produced one.
    pub fn snapshot(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|lock| lock.clone())
    }

    fn send(&self, command: GameLoopCommand) -> bool {
        let Ok(guard) = self.command_tx.lock() else {
            return false;
        };
        match guard.as_ref() {
            Some(tx) => tx.send(command).is_ok(),
            None => false,
        }
    }
}
