//! BASTION application shell.
//!
//! Wires the simulation into a fixed-rate game loop thread that a front end
//! drives through a command channel and polls for snapshots.

pub mod game_loop;
pub mod state;

pub use bastion_core as core;
