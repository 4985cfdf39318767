//! Snapshot system: queries the ECS world and builds a complete GameStateSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use bastion_core::components::*;
use bastion_core::constants::ENEMY_HEALTH;
use bastion_core::enums::{Facing, GamePhase};
use bastion_core::events::SimEvent;
use bastion_core::state::*;
use bastion_core::types::{Position, SimTime, Velocity};

use crate::clock::Clock;
use crate::directory::key_of;
use crate::ledger::Ledger;
use crate::structures::StructureRegistry;

/// Read-only sources for one snapshot.
pub struct SnapshotSources<'a> {
    pub world: &'a World,
    pub time: SimTime,
    pub phase: GamePhase,
    pub clock: &'a Clock,
    pub ledger: &'a Ledger,
    pub registry: &'a StructureRegistry,
}

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(sources: &SnapshotSources<'_>, events: Vec<SimEvent>) -> GameStateSnapshot {
    let world = sources.world;
    GameStateSnapshot {
        time: sources.time,
        phase: sources.phase,
        clock: sources.clock.view(),
        coins: sources.ledger.balance(),
        player: build_player(world),
        villagers: build_villagers(world),
        enemies: build_enemies(world),
        structures: sources.registry.views(world),
        pickups: sources.ledger.views(),
        events,
    }
}

fn build_player(world: &World) -> Option<PlayerView> {
    world
        .query::<(&Player, &Position, &Facing, &Velocity)>()
        .iter()
        .next()
        .map(|(entity, (_, pos, facing, vel))| PlayerView {
            key: key_of(entity),
            position: *pos,
            facing: *facing,
            moving: vel.x != 0.0,
        })
}

fn build_villagers(world: &World) -> Vec<VillagerView> {
    world
        .query::<(&Villager, &Position, &Facing, &Fleeing)>()
        .iter()
        .map(|(entity, (villager, pos, facing, fleeing))| VillagerView {
            key: key_of(entity),
            position: *pos,
            facing: *facing,
            state: villager.state,
            role: villager.role,
            fleeing: fleeing.0,
        })
        .collect()
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    world
        .query::<(&Enemy, &Position, &Facing)>()
        .iter()
        .map(|(entity, (enemy, pos, facing))| EnemyView {
            key: key_of(entity),
            position: *pos,
            facing: *facing,
            state: enemy.state,
            health: enemy.health,
            max_health: ENEMY_HEALTH,
            target: enemy.target.map(|t| t.key),
        })
        .collect()
}
