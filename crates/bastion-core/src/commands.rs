//! Player commands sent from the frontend to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityKey;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Movement ---
    /// Resolved horizontal input. `None` stops the player.
    SetDirection { direction: Option<Facing> },

    // --- Building ---
    /// Place a structure on the ground at `x`, paying its build cost.
    PlaceStructure { kind: StructureKind, x: f64 },

    // --- Villagers ---
    /// Change a villager's occupation.
    SetVillagerRole {
        villager: EntityKey,
        role: VillagerRole,
    },

    // --- Simulation control ---
    /// Set time scale (1.0 = normal, 2.0 = double, 0.0 = paused).
    SetTimeScale { scale: f64 },
    /// Found the settlement and start the clock.
    StartGame,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}
