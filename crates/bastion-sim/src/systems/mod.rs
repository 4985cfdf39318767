//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are plain functions over `&mut World` plus whatever owned state
//! they need passed in explicitly. They do not own state themselves: actor
//! state lives in components, coins in the `Ledger`, structures in the
//! `StructureRegistry`.

pub mod enemies;
pub mod movement;
pub mod player;
pub mod snapshot;
pub mod villagers;
pub mod wave_spawner;
