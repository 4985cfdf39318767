//! Game state snapshot: the complete visible state handed to the renderer each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{EntityKey, Position, SimTime};

/// Complete game state broadcast to the frontend after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub clock: ClockView,
    pub coins: u32,
    pub player: Option<PlayerView>,
    pub villagers: Vec<VillagerView>,
    pub enemies: Vec<EnemyView>,
    pub structures: Vec<StructureView>,
    pub pickups: Vec<PickupView>,
    pub events: Vec<SimEvent>,
}

/// Day/night clock state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockView {
    pub phase: DayPhase,
    pub day_count: u32,
    pub elapsed_in_phase_ms: f64,
    /// Position in the full day+night cycle, [0, 1).
    pub cycle_progress: f64,
    /// Night sky overlay alpha, [0, 1].
    pub sky_darkness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub key: EntityKey,
    pub position: Position,
    pub facing: Facing,
    pub moving: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VillagerView {
    pub key: EntityKey,
    pub position: Position,
    pub facing: Facing,
    pub state: VillagerState,
    pub role: VillagerRole,
    pub fleeing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub key: EntityKey,
    pub position: Position,
    pub facing: Facing,
    pub state: EnemyState,
    pub health: i32,
    pub max_health: i32,
    pub target: Option<EntityKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureView {
    pub key: EntityKey,
    pub kind: StructureKind,
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub health: i32,
    pub max_health: i32,
    /// health / max_health, for the health bar fill.
    pub health_ratio: f64,
    pub health_tier: HealthTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupView {
    pub id: u32,
    pub position: Position,
    pub value: u32,
}
