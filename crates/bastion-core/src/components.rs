//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in the behavior crate and in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityKey;

/// Marks the single player entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player;

/// Resolved input for the player this tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// `None` means stand still.
    pub direction: Option<Facing>,
}

/// Movement speed in units per second.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Speed(pub f64);

/// A weak reference from an actor to something it is going after.
///
/// Never owns the target. The key is re-resolved against the world on every
/// use, and a key that no longer resolves means "no target".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub key: EntityKey,
    pub kind: TargetKind,
}

/// Enemy state machine data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub health: i32,
    pub state: EnemyState,
    pub target: Option<TargetRef>,
    /// Milliseconds until the next hit is allowed. Never below zero.
    pub cooldown_ms: f64,
}

/// Villager state machine data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Villager {
    pub state: VillagerState,
    pub role: VillagerRole,
    pub idle_timer_ms: f64,
    pub max_idle_ms: f64,
    pub walk_timer_ms: f64,
    pub max_walk_ms: f64,
    /// x the villager wanders around.
    pub home_x: f64,
}

/// A stationary building.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Structure {
    pub kind: StructureKind,
    pub health: i32,
    pub max_health: i32,
    pub width: f64,
    pub height: f64,
}

/// Periodic production timer for farms, mines and recruitment huts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProductionTimer {
    /// Simulation time of the last production. `None` until the first
    /// structure tick stamps it.
    pub last_production_ms: Option<f64>,
}

/// Target tracking for towers. Shots are recorded but deal no damage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TowerTracker {
    pub last_attack_ms: Option<f64>,
    pub tracked: Option<EntityKey>,
    pub shots_recorded: u32,
}

/// Set while a villager is running from an enemy at night.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleeing(pub bool);
