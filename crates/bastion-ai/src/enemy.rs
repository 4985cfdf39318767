//! Enemy behavior finite state machine.
//!
//! Walk: pick a target by strict priority and head for it.
//!   1. any structure within attack range (engage, go Attack)
//!   2. the player within detection range
//!   3. a villager within detection range
//!   4. the castle
//!
//! Attack: stand still facing the target and hit it whenever the cooldown
//! has run out. Drop back to Walk once the target is gone or out of range.

use bastion_core::components::TargetRef;
use bastion_core::constants::*;
use bastion_core::enums::{EnemyState, Facing};
use bastion_core::types::Position;

use crate::sensing::{first_within, Sighting};

/// Input to the enemy FSM for a single entity.
pub struct EnemyContext<'a> {
    pub position: Position,
    pub state: EnemyState,
    pub speed: f64,
    /// Cooldown remaining after this tick's decrement.
    pub cooldown_ms: f64,
    /// Current target, already resolved against the world. `None` when the
    /// enemy has no target or its target no longer exists.
    pub target: Option<Sighting>,
    /// Live structures in registry order.
    pub structures: &'a [Sighting],
    pub player: Option<Sighting>,
    /// Live villagers in directory order.
    pub villagers: &'a [Sighting],
    pub castle: Option<Sighting>,
}

/// Output from the enemy FSM.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyUpdate {
    pub new_state: EnemyState,
    pub target: Option<TargetRef>,
    pub velocity_x: f64,
    /// New facing, `None` to keep the current one.
    pub facing: Option<Facing>,
    /// Entity to hit this tick.
    pub strike: Option<TargetRef>,
    pub cooldown_ms: f64,
    pub state_changed: bool,
}

/// Result of the walk-state target scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetChoice {
    /// A structure is close enough to hit.
    Engage(Sighting),
    /// Something worth walking toward.
    Pursue(Sighting),
    /// Nothing to go after (castle already gone).
    Nothing,
}

/// Count the attack cooldown down by `delta_ms`, flooring at zero.
pub fn tick_cooldown(cooldown_ms: f64, delta_ms: f64) -> f64 {
    (cooldown_ms - delta_ms).max(0.0)
}

/// Evaluate the FSM for one enemy.
pub fn evaluate(ctx: &EnemyContext<'_>) -> EnemyUpdate {
    match ctx.state {
        EnemyState::Walk => evaluate_walk(ctx),
        EnemyState::Attack => evaluate_attack(ctx),
    }
}

/// Target priority scan used while walking.
pub fn select_target(ctx: &EnemyContext<'_>) -> TargetChoice {
    if let Some(structure) = first_within(&ctx.position, ctx.structures, ENEMY_ATTACK_RANGE) {
        return TargetChoice::Engage(structure);
    }

    if let Some(player) = ctx.player {
        if ctx.position.range_to(&player.position) < ENEMY_DETECTION_RANGE {
            return TargetChoice::Pursue(player);
        }
    }

    if let Some(villager) = first_within(&ctx.position, ctx.villagers, ENEMY_DETECTION_RANGE) {
        return TargetChoice::Pursue(villager);
    }

    match ctx.castle {
        Some(castle) => TargetChoice::Pursue(castle),
        None => TargetChoice::Nothing,
    }
}

fn evaluate_walk(ctx: &EnemyContext<'_>) -> EnemyUpdate {
    match select_target(ctx) {
        TargetChoice::Engage(structure) => EnemyUpdate {
            new_state: EnemyState::Attack,
            target: Some(structure.target_ref()),
            velocity_x: 0.0,
            facing: Some(Facing::toward(ctx.position.x, structure.position.x)),
            strike: None,
            cooldown_ms: ctx.cooldown_ms,
            state_changed: true,
        },
        TargetChoice::Pursue(target) => {
            let facing = Facing::toward(ctx.position.x, target.position.x);
            EnemyUpdate {
                new_state: EnemyState::Walk,
                target: Some(target.target_ref()),
                velocity_x: ctx.speed * facing.sign(),
                facing: Some(facing),
                strike: None,
                cooldown_ms: ctx.cooldown_ms,
                state_changed: false,
            }
        }
        TargetChoice::Nothing => EnemyUpdate {
            new_state: EnemyState::Walk,
            target: None,
            velocity_x: 0.0,
            facing: None,
            strike: None,
            cooldown_ms: ctx.cooldown_ms,
            state_changed: false,
        },
    }
}

fn evaluate_attack(ctx: &EnemyContext<'_>) -> EnemyUpdate {
    let back_to_walk = |target: Option<TargetRef>| EnemyUpdate {
        new_state: EnemyState::Walk,
        target,
        velocity_x: 0.0,
        facing: None,
        strike: None,
        cooldown_ms: ctx.cooldown_ms,
        state_changed: true,
    };

    let Some(target) = ctx.target else {
        return back_to_walk(None);
    };

    if ctx.position.range_to(&target.position) > ENEMY_ATTACK_RANGE {
        return back_to_walk(Some(target.target_ref()));
    }

    let ready = ctx.cooldown_ms <= 0.0;
    EnemyUpdate {
        new_state: EnemyState::Attack,
        target: Some(target.target_ref()),
        velocity_x: 0.0,
        facing: Some(Facing::toward(ctx.position.x, target.position.x)),
        strike: ready.then(|| target.target_ref()),
        cooldown_ms: if ready {
            ENEMY_ATTACK_COOLDOWN_MS
        } else {
            ctx.cooldown_ms
        },
        state_changed: false,
    }
}
