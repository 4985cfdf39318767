//! Kinematic integration system.
//!
//! Updates Position from Velocity each tick: x += vx * dt, clamped to the
//! world bounds. Vertical position belongs to the ground plane and is left
//! alone.

use hecs::World;

use bastion_core::types::{Position, Velocity};

/// Run horizontal integration for all entities with Position + Velocity.
pub fn run(world: &mut World, delta_ms: f64, world_size: f64) {
    let dt = delta_ms / 1000.0;
    for (_entity, (pos, vel)) in world.query_mut::<(&mut Position, &Velocity)>() {
        pos.x = (pos.x + vel.x * dt).clamp(0.0, world_size);
    }
}
