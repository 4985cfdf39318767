//! Enemy system: runs the enemy state machine and carries out strikes.
//!
//! Enemies are processed one at a time in directory order. Each enemy's
//! update and strike are applied before the next enemy is evaluated, so a
//! structure knocked down by one enemy is already gone for the next.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bastion_ai::enemy::{evaluate, tick_cooldown, EnemyContext, EnemyUpdate};
use bastion_core::components::{Enemy, Speed, TargetRef};
use bastion_core::constants::*;
use bastion_core::enums::{EnemyState, Facing, TargetKind};
use bastion_core::events::SimEvent;
use bastion_core::types::{EntityKey, Position, Velocity};

use crate::directory::{self, entity_of, key_of};
use crate::ledger::Ledger;
use crate::structures::StructureRegistry;

/// Per-enemy state read out of the world before evaluation.
struct EnemyReading {
    position: Position,
    state: EnemyState,
    speed: f64,
    cooldown_ms: f64,
    target: Option<TargetRef>,
}

pub fn run(
    world: &mut World,
    registry: &mut StructureRegistry,
    delta_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    let mut structures = registry.all(world);
    let player = directory::player_sighting(world);
    let villagers = directory::villager_sightings(world);

    for entity in directory::snapshot::<Enemy>(world) {
        let Some(reading) = read_enemy(world, entity) else {
            continue;
        };
        let target = reading
            .target
            .and_then(|target| directory::resolve_target(world, target));

        let ctx = EnemyContext {
            position: reading.position,
            state: reading.state,
            speed: reading.speed,
            cooldown_ms: tick_cooldown(reading.cooldown_ms, delta_ms),
            target,
            structures: &structures,
            player,
            villagers: &villagers,
            castle: registry.castle(world),
        };
        let update = evaluate(&ctx);
        apply(world, entity, &update);

        if let Some(strike) = update.strike {
            events.push(SimEvent::EnemyHit {
                enemy: key_of(entity),
                target: strike.key,
                target_kind: strike.kind,
            });
            // Only structures have health; hits on people are feedback only.
            if strike.kind == TargetKind::Structure
                && registry.damage(world, strike.key, ENEMY_ATTACK_DAMAGE, events)
            {
                structures.retain(|s| s.key != strike.key);
            }
        }
    }
}

fn read_enemy(world: &World, entity: Entity) -> Option<EnemyReading> {
    let mut query = world
        .query_one::<(&Enemy, &Position, &Speed)>(entity)
        .ok()?;
    let (enemy, position, speed) = query.get()?;
    if enemy.health <= 0 {
        return None;
    }
    Some(EnemyReading {
        position: *position,
        state: enemy.state,
        speed: speed.0,
        cooldown_ms: enemy.cooldown_ms,
        target: enemy.target,
    })
}

fn apply(world: &mut World, entity: Entity, update: &EnemyUpdate) {
    if let Ok((enemy, vel, facing)) =
        world.query_one_mut::<(&mut Enemy, &mut Velocity, &mut Facing)>(entity)
    {
        enemy.state = update.new_state;
        enemy.target = update.target;
        enemy.cooldown_ms = update.cooldown_ms;
        vel.x = update.velocity_x;
        if let Some(new_facing) = update.facing {
            *facing = new_facing;
        }
    }
    if update.state_changed {
        tracing::trace!(?entity, state = ?update.new_state, "enemy state changed");
    }
}

/// Deal `amount` damage to an enemy. At zero health the enemy is removed and
/// may leave a coin behind. Returns `true` if this call killed it; damage to
/// an enemy that is already gone does nothing.
pub fn take_damage(
    world: &mut World,
    ledger: &mut Ledger,
    rng: &mut ChaCha8Rng,
    key: EntityKey,
    amount: i32,
    events: &mut Vec<SimEvent>,
) -> bool {
    let Some(entity) = entity_of(key) else {
        return false;
    };
    let health = match world.get::<&mut Enemy>(entity) {
        Ok(mut enemy) if enemy.health > 0 => {
            enemy.health -= amount;
            enemy.health
        }
        _ => return false,
    };

    if health > 0 {
        events.push(SimEvent::EnemyDamaged { enemy: key, health });
        return false;
    }

    let position = world
        .get::<&Position>(entity)
        .map(|p| *p)
        .unwrap_or_default();
    let _ = world.despawn(entity);

    let dropped_coin = rng.gen_bool(ENEMY_COIN_DROP_CHANCE);
    if dropped_coin {
        ledger.create_pickup(position.x, position.y - ENEMY_COIN_DROP_LIFT, 1);
    }
    events.push(SimEvent::EnemyDied {
        enemy: key,
        position,
        dropped_coin,
    });
    tracing::debug!(x = position.x, dropped_coin, "enemy killed");
    true
}
