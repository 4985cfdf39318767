//! Wave spawning system: sends a wave of enemies at the settlement when
//! night falls.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bastion_core::constants::*;
use bastion_core::enums::Facing;

use crate::directory;

/// Enemies in the wave for `day_count`: 5 plus one per two days, capped at 20.
pub fn wave_size(day_count: u32) -> u32 {
    (WAVE_BASE_SIZE + day_count / 2).min(WAVE_MAX_SIZE)
}

/// Where an enemy enters: 1000 units beyond the player on the chosen side,
/// kept clear of the world edge.
pub fn spawn_x(anchor_x: f64, left: bool, world_size: f64) -> f64 {
    if left {
        (anchor_x - WAVE_SPAWN_OFFSET).max(WAVE_EDGE_MARGIN)
    } else {
        (anchor_x + WAVE_SPAWN_OFFSET).min(world_size - WAVE_EDGE_MARGIN)
    }
}

/// Spawn the wave for `day_count`. Each enemy picks a side at random and
/// starts out facing the castle. Returns the number spawned.
pub fn spawn_wave(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    day_count: u32,
    world_size: f64,
    castle_x: Option<f64>,
) -> u32 {
    let size = wave_size(day_count);
    let anchor_x = directory::player(world)
        .map(|(_, pos)| pos.x)
        .or(castle_x)
        .unwrap_or(PLAYER_START_X);

    for _ in 0..size {
        let left = rng.gen_bool(0.5);
        let x = spawn_x(anchor_x, left, world_size);
        let facing = Facing::toward(x, castle_x.unwrap_or(x));
        crate::world_setup::spawn_enemy(world, rng, x, facing);
    }

    tracing::info!(day_count, size, anchor_x, "night wave spawned");
    size
}
