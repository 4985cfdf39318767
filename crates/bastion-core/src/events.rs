//! Events emitted by the simulation for audio, particle and UI feedback.
//!
//! Events are fire-and-forget: the simulation queues them during a tick and
//! hands them out with the next snapshot.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityKey, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// An enemy struck its target.
    EnemyHit {
        enemy: EntityKey,
        target: EntityKey,
        target_kind: TargetKind,
    },
    /// An enemy lost health but survived.
    EnemyDamaged { enemy: EntityKey, health: i32 },
    /// An enemy was killed.
    EnemyDied {
        enemy: EntityKey,
        position: Position,
        dropped_coin: bool,
    },
    /// A structure took damage.
    StructureDamaged {
        structure: EntityKey,
        kind: StructureKind,
        health: i32,
        max_health: i32,
    },
    /// A structure was destroyed and removed.
    StructureDestroyed {
        structure: EntityKey,
        kind: StructureKind,
        position: Position,
    },
    /// A structure was placed.
    StructureBuilt {
        structure: EntityKey,
        kind: StructureKind,
        position: Position,
    },
    /// A production structure dropped a coin.
    CoinProduced {
        kind: StructureKind,
        position: Position,
        value: u32,
    },
    /// The player picked up coins.
    CoinsCollected { amount: u32, balance: u32 },
    /// A recruitment hut (or the settlement) produced a villager.
    VillagerSpawned { villager: EntityKey, position: Position },
    NightStarted { day_count: u32 },
    DayStarted { day_count: u32 },
    /// A night wave arrived.
    WaveSpawned { day_count: u32, size: u32 },
    /// The castle fell.
    Defeated { day_count: u32 },
}
