//! Actor behavior for BASTION.
//!
//! Implements the enemy and villager state machines as pure functions over
//! plain data, plus the spatial helpers they share. No ECS dependency: the
//! simulation crate gathers a context per actor, evaluates it here, and
//! applies the returned update.

pub mod enemy;
pub mod sensing;
pub mod villager;

pub use bastion_core as core;
