//! Simulation engine for BASTION.
//!
//! Owns the hecs ECS world, the day/night clock, the coin ledger and the
//! structure registry, runs systems in a fixed order every tick, and
//! produces GameStateSnapshots for the frontend.

pub mod clock;
pub mod directory;
pub mod engine;
pub mod ledger;
pub mod structures;
pub mod systems;
pub mod world_setup;

pub use bastion_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
