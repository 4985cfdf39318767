//! Villager behavior state machine.
//!
//! Villagers alternate between idling and wandering on randomized timers,
//! turning back when they stray too far from home. Two overrides run after
//! the base update, in order: the archer alert (stand and face the nearest
//! enemy) and, at night, the flee response (run from the nearest enemy at
//! increased speed). The flee response wins when both apply.

use rand::Rng;

use bastion_core::components::Villager;
use bastion_core::constants::*;
use bastion_core::enums::{Facing, VillagerRole, VillagerState};
use bastion_core::types::Position;

use crate::sensing::{nearest_within, Sighting};

/// Input to the villager FSM for a single entity.
pub struct VillagerContext<'a> {
    pub villager: Villager,
    pub position: Position,
    pub facing: Facing,
    pub speed: f64,
    pub delta_ms: f64,
    pub is_night: bool,
    /// Live enemies, any order.
    pub enemies: &'a [Sighting],
}

/// Output from the villager FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VillagerUpdate {
    pub villager: Villager,
    pub facing: Facing,
    pub speed: f64,
    pub velocity_x: f64,
    /// Whether the night flee response fired this tick.
    pub fleeing: bool,
}

/// Random idle/walk duration in [2000, 5000] ms.
pub fn roll_timer<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(VILLAGER_MIN_TIMER_MS..=VILLAGER_MAX_TIMER_MS) as f64
}

/// Initial state for a villager living at `home_x`.
pub fn spawn_state<R: Rng>(home_x: f64, rng: &mut R) -> (Villager, Facing) {
    let facing = if rng.gen_bool(0.5) {
        Facing::Left
    } else {
        Facing::Right
    };
    let villager = Villager {
        state: VillagerState::Idle,
        role: VillagerRole::default(),
        idle_timer_ms: 0.0,
        max_idle_ms: roll_timer(rng),
        walk_timer_ms: 0.0,
        max_walk_ms: roll_timer(rng),
        home_x,
    };
    (villager, facing)
}

/// Switch to Idle and restart the idle timer with a fresh threshold.
pub fn enter_idle<R: Rng>(villager: &mut Villager, rng: &mut R) {
    villager.state = VillagerState::Idle;
    villager.idle_timer_ms = 0.0;
    villager.max_idle_ms = roll_timer(rng);
}

/// Switch to Walk, restart the walk timer and maybe turn around.
pub fn enter_walk<R: Rng>(villager: &mut Villager, facing: &mut Facing, rng: &mut R) {
    villager.state = VillagerState::Walk;
    villager.walk_timer_ms = 0.0;
    villager.max_walk_ms = roll_timer(rng);
    if rng.gen_bool(0.5) {
        *facing = facing.flipped();
    }
}

/// Evaluate one villager for one tick.
pub fn evaluate<R: Rng>(ctx: &VillagerContext<'_>, rng: &mut R) -> VillagerUpdate {
    let mut villager = ctx.villager;
    let mut facing = ctx.facing;
    let mut speed = ctx.speed;
    let mut fleeing = false;

    match villager.state {
        VillagerState::Idle => {
            villager.idle_timer_ms += ctx.delta_ms;
            if villager.idle_timer_ms >= villager.max_idle_ms {
                enter_walk(&mut villager, &mut facing, rng);
            }
        }
        VillagerState::Walk => {
            villager.walk_timer_ms += ctx.delta_ms;
            if villager.walk_timer_ms >= villager.max_walk_ms {
                enter_idle(&mut villager, rng);
            }
            facing = wander_bound(ctx.position.x, villager.home_x, facing);
        }
    }

    apply_role(&mut villager, &mut facing, ctx, rng);

    if ctx.is_night {
        let threats = nearest_within(&ctx.position, ctx.enemies, VILLAGER_FLEE_RANGE);
        if let Some((_, nearest)) = threats.first() {
            enter_walk(&mut villager, &mut facing, rng);
            facing = Facing::away_from(ctx.position.x, nearest.position.x);
            speed = VILLAGER_FLEE_SPEED;
            fleeing = true;
        } else {
            speed = VILLAGER_SPEED;
        }
    }

    let velocity_x = match villager.state {
        VillagerState::Walk => speed * facing.sign(),
        VillagerState::Idle => 0.0,
    };

    VillagerUpdate {
        villager,
        facing,
        speed,
        velocity_x,
        fleeing,
    }
}

/// Soft wander bound: beyond the range and still heading out, turn back.
pub fn wander_bound(x: f64, home_x: f64, facing: Facing) -> Facing {
    if (x - home_x).abs() <= VILLAGER_WANDER_RANGE {
        return facing;
    }
    let heading_out = (x > home_x && facing == Facing::Right) || (x < home_x && facing == Facing::Left);
    if heading_out {
        facing.flipped()
    } else {
        facing
    }
}

fn apply_role<R: Rng>(
    villager: &mut Villager,
    facing: &mut Facing,
    ctx: &VillagerContext<'_>,
    rng: &mut R,
) {
    match villager.role {
        VillagerRole::Archer => {
            let nearby = nearest_within(&ctx.position, ctx.enemies, ARCHER_ALERT_RANGE);
            if let Some((_, nearest)) = nearby.first() {
                enter_idle(villager, rng);
                *facing = Facing::toward(ctx.position.x, nearest.position.x);
                // No shot is fired; archers only hold and watch.
            }
        }
        // Builders and farmers have no work to do yet.
        VillagerRole::Builder | VillagerRole::Farmer | VillagerRole::Villager => {}
    }
}
