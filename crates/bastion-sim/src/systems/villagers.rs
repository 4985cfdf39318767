//! Villager system: runs the villager state machine for every villager.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use bastion_ai::sensing::Sighting;
use bastion_ai::villager::{evaluate, VillagerContext, VillagerUpdate};
use bastion_core::components::{Fleeing, Speed, Villager};
use bastion_core::enums::{Facing, VillagerRole};
use bastion_core::types::{EntityKey, Position, Velocity};

use crate::directory;

/// Evaluate and apply the villager FSM, one villager at a time in directory
/// order. Each villager sees the others' already-applied updates.
pub fn run(world: &mut World, rng: &mut ChaCha8Rng, delta_ms: f64, is_night: bool) {
    let enemies = directory::enemy_sightings(world);

    for entity in directory::snapshot::<Villager>(world) {
        let Some(ctx) = read_context(world, entity, delta_ms, is_night, &enemies) else {
            continue;
        };
        let update = evaluate(&ctx, rng);
        apply(world, entity, &update);
    }
}

fn read_context<'a>(
    world: &World,
    entity: Entity,
    delta_ms: f64,
    is_night: bool,
    enemies: &'a [Sighting],
) -> Option<VillagerContext<'a>> {
    let mut query = world
        .query_one::<(&Villager, &Position, &Facing, &Speed)>(entity)
        .ok()?;
    let (villager, position, facing, speed) = query.get()?;
    Some(VillagerContext {
        villager: *villager,
        position: *position,
        facing: *facing,
        speed: speed.0,
        delta_ms,
        is_night,
        enemies,
    })
}

fn apply(world: &mut World, entity: Entity, update: &VillagerUpdate) {
    if let Ok((villager, facing, speed, vel, fleeing)) = world
        .query_one_mut::<(&mut Villager, &mut Facing, &mut Speed, &mut Velocity, &mut Fleeing)>(
            entity,
        )
    {
        *villager = update.villager;
        *facing = update.facing;
        speed.0 = update.speed;
        vel.x = update.velocity_x;
        fleeing.0 = update.fleeing;
    }
}

/// Change a villager's role. Returns `false` if the key is not a villager.
pub fn set_role(world: &mut World, key: EntityKey, role: VillagerRole) -> bool {
    let Some(entity) = directory::entity_of(key) else {
        return false;
    };
    match world.get::<&mut Villager>(entity) {
        Ok(mut villager) => {
            villager.role = role;
            true
        }
        Err(_) => false,
    }
}
