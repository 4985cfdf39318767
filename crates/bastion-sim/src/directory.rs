//! Actor directory: read-only spatial views over the hecs world.
//!
//! Behavior code never holds references into the world. It gets plain
//! `Sighting` lists built here, and turns weak `TargetRef`s back into live
//! entities through `resolve_target`, which checks liveness on every call.

use hecs::{Entity, World};

use bastion_ai::sensing::Sighting;
use bastion_core::components::*;
use bastion_core::enums::TargetKind;
use bastion_core::types::{EntityKey, Position};

/// Stable key for a hecs entity.
pub fn key_of(entity: Entity) -> EntityKey {
    EntityKey(entity.to_bits().get())
}

/// The entity a key was made from. Says nothing about liveness.
pub fn entity_of(key: EntityKey) -> Option<Entity> {
    Entity::from_bits(key.0)
}

/// Entities carrying component `T`, in world iteration order. Systems walk
/// this list instead of a live query so that spawns and despawns during a
/// phase cannot disturb the traversal.
pub fn snapshot<T: hecs::Component>(world: &World) -> Vec<Entity> {
    world.query::<&T>().iter().map(|(entity, _)| entity).collect()
}

pub fn player(world: &World) -> Option<(Entity, Position)> {
    world
        .query::<(&Player, &Position)>()
        .iter()
        .next()
        .map(|(entity, (_, pos))| (entity, *pos))
}

pub fn player_sighting(world: &World) -> Option<Sighting> {
    player(world).map(|(entity, pos)| Sighting::new(key_of(entity), TargetKind::Player, pos))
}

pub fn villager_sightings(world: &World) -> Vec<Sighting> {
    world
        .query::<(&Villager, &Position)>()
        .iter()
        .map(|(entity, (_, pos))| Sighting::new(key_of(entity), TargetKind::Villager, *pos))
        .collect()
}

/// Live enemies. Enemies at zero health are on their way out and excluded.
pub fn enemy_sightings(world: &World) -> Vec<Sighting> {
    world
        .query::<(&Enemy, &Position)>()
        .iter()
        .filter(|(_, (enemy, _))| enemy.health > 0)
        .map(|(entity, (_, pos))| Sighting::new(key_of(entity), TargetKind::Enemy, *pos))
        .collect()
}

pub fn villager_count(world: &World) -> u32 {
    world.query::<&Villager>().iter().count() as u32
}

pub fn enemy_count(world: &World) -> u32 {
    world.query::<&Enemy>().iter().count() as u32
}

/// Turn a weak target reference back into a sighting, or `None` if the
/// entity is gone or is no longer the kind of thing it was.
pub fn resolve_target(world: &World, target: TargetRef) -> Option<Sighting> {
    let entity = entity_of(target.key)?;
    let alive = match target.kind {
        TargetKind::Structure => world
            .get::<&Structure>(entity)
            .map(|s| s.health > 0)
            .unwrap_or(false),
        TargetKind::Player => world.get::<&Player>(entity).is_ok(),
        TargetKind::Villager => world.get::<&Villager>(entity).is_ok(),
        TargetKind::Enemy => world
            .get::<&Enemy>(entity)
            .map(|e| e.health > 0)
            .unwrap_or(false),
    };
    if !alive {
        return None;
    }
    let position = *world.get::<&Position>(entity).ok()?;
    Some(Sighting::new(target.key, target.kind, position))
}
