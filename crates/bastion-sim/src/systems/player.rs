//! Player system: turns the resolved input direction into motion and picks
//! up coins in reach.

use hecs::World;

use bastion_core::components::{Player, PlayerIntent, Speed};
use bastion_core::constants::COIN_COLLECTION_RADIUS;
use bastion_core::enums::Facing;
use bastion_core::events::SimEvent;
use bastion_core::types::Velocity;

use crate::directory;
use crate::ledger::Ledger;

pub fn run(world: &mut World, ledger: &mut Ledger, events: &mut Vec<SimEvent>) {
    for (_entity, (_player, intent, facing, vel, speed)) in
        world.query_mut::<(&Player, &PlayerIntent, &mut Facing, &mut Velocity, &Speed)>()
    {
        match intent.direction {
            Some(direction) => {
                *facing = direction;
                vel.x = speed.0 * direction.sign();
            }
            None => vel.x = 0.0,
        }
    }

    // Collected coins leave the ledger here, before villagers, enemies or
    // structures can see them.
    if let Some((_, pos)) = directory::player(world) {
        let amount = ledger.collect_within_radius(pos.x, pos.y, COIN_COLLECTION_RADIUS);
        if amount > 0 {
            events.push(SimEvent::CoinsCollected {
                amount,
                balance: ledger.balance(),
            });
        }
    }
}

/// Replace the player's input direction.
pub fn set_direction(world: &mut World, direction: Option<Facing>) {
    for (_entity, (_player, intent)) in world.query_mut::<(&Player, &mut PlayerIntent)>() {
        intent.direction = direction;
    }
}
