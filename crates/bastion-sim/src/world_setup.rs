//! Entity spawn factories for setting up the simulation world.
//!
//! Creates the player, villagers and enemies with their component bundles,
//! and founds the starting settlement.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bastion_ai::villager;
use bastion_core::components::*;
use bastion_core::config::GameConfig;
use bastion_core::constants::*;
use bastion_core::enums::{EnemyState, Facing, StructureKind};
use bastion_core::error::SimError;
use bastion_core::types::{Position, Velocity};

use crate::ledger::Ledger;
use crate::structures::StructureRegistry;

/// Found the settlement: castle, player, the first villagers and a scatter
/// of coins across the map. The ledger keeps its starting balance.
pub fn setup_settlement(
    world: &mut World,
    registry: &mut StructureRegistry,
    ledger: &mut Ledger,
    rng: &mut ChaCha8Rng,
    config: &GameConfig,
) -> Result<(), SimError> {
    registry.create(world, StructureKind::Castle, CASTLE_START_X, GROUND_Y)?;
    spawn_player(world, PLAYER_START_X);

    for _ in 0..INITIAL_VILLAGERS {
        let x = CASTLE_START_X + rng.gen_range(-INITIAL_VILLAGER_SPREAD..=INITIAL_VILLAGER_SPREAD);
        spawn_villager(world, rng, x);
    }

    let pickups = (config.world_size / SEED_PICKUP_SPACING).floor() as u32;
    let (low, high) = (SEED_PICKUP_MARGIN, config.world_size - SEED_PICKUP_MARGIN);
    for _ in 0..pickups {
        let x = rng.gen_range(low..=high);
        ledger.create_pickup(x, GROUND_Y, 1);
    }

    tracing::info!(
        villagers = INITIAL_VILLAGERS,
        pickups,
        balance = ledger.balance(),
        "settlement founded"
    );
    Ok(())
}

/// Spawn the player standing still at `x`.
pub fn spawn_player(world: &mut World, x: f64) -> Entity {
    world.spawn((
        Player,
        PlayerIntent::default(),
        Position::new(x, GROUND_Y),
        Velocity::default(),
        Facing::default(),
        Speed(PLAYER_SPEED),
    ))
}

/// Spawn an idle villager whose home is `x`.
pub fn spawn_villager(world: &mut World, rng: &mut ChaCha8Rng, x: f64) -> Entity {
    let (state, facing) = villager::spawn_state(x, rng);
    world.spawn((
        state,
        Position::new(x, GROUND_Y),
        Velocity::default(),
        facing,
        Speed(VILLAGER_SPEED),
        Fleeing::default(),
    ))
}

/// Spawn a walking enemy at `x` facing `facing`, with a random speed.
pub fn spawn_enemy(world: &mut World, rng: &mut ChaCha8Rng, x: f64, facing: Facing) -> Entity {
    let speed = rng.gen_range(ENEMY_MIN_SPEED..=ENEMY_MAX_SPEED);
    world.spawn((
        Enemy {
            health: ENEMY_HEALTH,
            state: EnemyState::Walk,
            target: None,
            cooldown_ms: 0.0,
        },
        Position::new(x, GROUND_Y),
        Velocity::default(),
        facing,
        Speed(speed),
    ))
}
