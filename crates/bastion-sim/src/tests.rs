//! Tests for the simulation engine, clock, ledger, structure registry and
//! actor systems.

use std::sync::{Arc, Mutex};

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bastion_ai::sensing::Sighting;
use bastion_core::commands::PlayerCommand;
use bastion_core::components::{Enemy, TowerTracker, Villager};
use bastion_core::config::{default_catalog, GameConfig};
use bastion_core::constants::*;
use bastion_core::enums::*;
use bastion_core::error::{PlacementError, SimError};
use bastion_core::events::SimEvent;
use bastion_core::types::{EntityKey, Position};

use crate::clock::{Clock, PhaseTransition};
use crate::directory::{self, entity_of, key_of};
use crate::engine::SimulationEngine;
use crate::ledger::Ledger;
use crate::structures::{population_cap, SpawnOrder, StructureQueries, StructureRegistry};
use crate::systems::{enemies, wave_spawner};
use crate::world_setup;

fn clear_pickups(engine: &mut SimulationEngine) {
    let ids: Vec<_> = engine.ledger().pickups().map(|p| p.id).collect();
    for id in ids {
        engine.ledger_mut().collect(id);
    }
}

/// A founded settlement with the scattered coins swept away and the purse
/// back at its starting balance, so tests control every coin.
fn started_engine(config: GameConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::new(config);
    engine.queue_command(PlayerCommand::StartGame);
    engine.advance(0.0);
    clear_pickups(&mut engine);
    let swept = engine.ledger().balance() - engine.config().starting_coins;
    engine.ledger_mut().spend(swept);
    engine
}

fn castle_key(engine: &SimulationEngine) -> EntityKey {
    engine
        .registry()
        .castle(engine.world())
        .expect("castle should stand")
        .key
}

fn queries(now_ms: f64, villager_count: u32, enemies: &[Sighting]) -> StructureQueries<'_> {
    StructureQueries {
        now_ms,
        day_count: 1,
        villager_count,
        enemies,
    }
}

// ---- Clock ----

#[test]
fn test_clock_day_then_night_then_day() {
    let mut clock = Clock::new(180_000.0);
    assert!(clock.is_day());
    assert_eq!(clock.day_count(), 1);

    assert_eq!(clock.advance(179_999.0), None);
    assert!(clock.is_day());

    let transition = clock.advance(1.0);
    assert_eq!(transition, Some(PhaseTransition::NightStarted { day_count: 1 }));
    assert!(clock.is_night());
    assert_eq!(clock.elapsed_in_phase_ms(), 0.0);

    let transition = clock.advance(90_000.0);
    assert_eq!(transition, Some(PhaseTransition::DayStarted { day_count: 2 }));
    assert!(clock.is_day());
    assert_eq!(clock.day_count(), 2);
    assert_eq!(clock.elapsed_in_phase_ms(), 0.0);
}

#[test]
fn test_clock_one_transition_per_advance() {
    let mut clock = Clock::new(1000.0);
    let transition = clock.advance(10_000.0);
    assert_eq!(transition, Some(PhaseTransition::NightStarted { day_count: 1 }));
    assert!(clock.is_night());
    assert_eq!(clock.day_count(), 1);
    assert_eq!(clock.elapsed_in_phase_ms(), 0.0);
}

#[test]
fn test_clock_day_count_monotonic_and_phases_alternate() {
    let mut clock = Clock::new(1000.0);
    let mut last_day = clock.day_count();
    let mut last_phase = clock.phase();
    let mut transitions = 0;

    for _ in 0..2000 {
        if clock.advance(37.0).is_some() {
            assert_ne!(clock.phase(), last_phase, "phases must alternate");
            last_phase = clock.phase();
            transitions += 1;
        }
        assert!(clock.day_count() >= last_day);
        last_day = clock.day_count();
    }
    assert!(transitions > 40);
}

#[test]
fn test_clock_ignores_bad_deltas() {
    let mut clock = Clock::new(1000.0);
    clock.advance(500.0);
    clock.advance(-200.0);
    clock.advance(f64::NAN);
    clock.advance(f64::INFINITY);
    assert_eq!(clock.elapsed_in_phase_ms(), 500.0);
    assert!(clock.is_day());
}

#[test]
fn test_clock_subscribers_run_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut clock = Clock::new(100.0);

    for label in ["first", "second"] {
        let log = Arc::clone(&log);
        clock.subscribe_night_start(move |_| log.lock().unwrap().push(label));
    }
    let day_log = Arc::clone(&log);
    clock.subscribe_day_start(move |t| {
        if let PhaseTransition::DayStarted { day_count } = t {
            assert_eq!(*day_count, 2);
        }
        day_log.lock().unwrap().push("day");
    });

    clock.advance(100.0);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    clock.advance(50.0);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "day"]);
}

#[test]
fn test_clock_cycle_progress_and_darkness() {
    let mut clock = Clock::new(1000.0);
    assert_eq!(clock.cycle_progress(), 0.0);
    assert_eq!(clock.sky_darkness(), 0.0);

    clock.advance(500.0);
    assert!((clock.cycle_progress() - 0.33).abs() < 1e-9);
    assert!((clock.sky_darkness() - 0.25).abs() < 1e-9);

    clock.advance(500.0);
    assert!((clock.cycle_progress() - 0.66).abs() < 1e-9);
    assert!((clock.sky_darkness() - 0.5).abs() < 1e-9);

    // Night is 500 ms; midnight is the darkest point.
    clock.advance(250.0);
    assert!((clock.cycle_progress() - 0.83).abs() < 1e-9);
    assert!((clock.sky_darkness() - 1.0).abs() < 1e-9);

    clock.advance(200.0);
    assert!(clock.cycle_progress() < 1.0);
    assert!((clock.sky_darkness() - 0.6).abs() < 1e-9);
}

// ---- Ledger ----

#[test]
fn test_ledger_add_and_spend() {
    let mut ledger = Ledger::new(10);
    assert_eq!(ledger.add_coins(5), 15);
    assert!(ledger.can_afford(15));
    assert!(!ledger.can_afford(16));
    assert_eq!(ledger.spend(12), 3);
    assert_eq!(ledger.spend(10), 0, "overspend floors at zero");
}

#[test]
fn test_ledger_radius_query_is_inclusive() {
    let mut ledger = Ledger::new(0);
    let near = ledger.create_pickup(100.0, 0.0, 1);
    let edge = ledger.create_pickup(0.0, 100.0, 1);
    ledger.create_pickup(100.1, 0.0, 1);

    let mut found: Vec<_> = ledger
        .query_within_radius(0.0, 0.0, 100.0)
        .into_iter()
        .map(|p| p.id)
        .collect();
    found.sort();
    let mut expected = vec![near, edge];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn test_ledger_collect_is_once_only() {
    let mut ledger = Ledger::new(0);
    let id = ledger.create_pickup(10.0, 10.0, 3);

    assert_eq!(ledger.collect(id).map(|p| p.value), Some(3));
    assert_eq!(ledger.collect(id), None);
    assert_eq!(ledger.pickup_count(), 0);
}

#[test]
fn test_ledger_collect_within_radius_credits_once() {
    let mut ledger = Ledger::new(0);
    ledger.create_pickup(50.0, 0.0, 1);
    ledger.create_pickup(-30.0, 0.0, 2);
    ledger.create_pickup(500.0, 0.0, 7);

    assert_eq!(ledger.collect_within_radius(0.0, 0.0, 100.0), 3);
    assert_eq!(ledger.balance(), 3);
    assert_eq!(ledger.collect_within_radius(0.0, 0.0, 100.0), 0);
    assert_eq!(ledger.balance(), 3);
    assert_eq!(ledger.pickup_count(), 1);
}

#[test]
fn test_pickup_ids_never_reused() {
    let mut ledger = Ledger::new(0);
    let a = ledger.create_pickup(0.0, 0.0, 1);
    ledger.collect(a);
    let b = ledger.create_pickup(0.0, 0.0, 1);
    assert_ne!(a, b);
}

// ---- Structure registry ----

#[test]
fn test_create_structure_full_health() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let key = registry
        .create(&mut world, StructureKind::Wall, 1000.0, GROUND_Y)
        .unwrap();

    let views = registry.views(&world);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].key, key);
    assert_eq!(views[0].health, 10);
    assert_eq!(views[0].max_health, 10);
    assert_eq!(views[0].health_tier, HealthTier::Green);
}

#[test]
fn test_create_unknown_structure_type() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let err = registry
        .create_named(&mut world, "palace", 0.0, 0.0)
        .unwrap_err();
    assert_eq!(err, SimError::UnknownStructureType("palace".into()));
    assert!(registry.is_empty());

    let mut catalog = default_catalog();
    catalog.remove(&StructureKind::Mine);
    let mut registry = StructureRegistry::new(catalog);
    assert!(matches!(
        registry.create(&mut world, StructureKind::Mine, 0.0, 0.0),
        Err(SimError::UnknownStructureType(_))
    ));
}

#[test]
fn test_castle_destroyed_exactly_once() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let castle = registry
        .create(&mut world, StructureKind::Castle, CASTLE_START_X, GROUND_Y)
        .unwrap();
    let mut events = Vec::new();

    assert!(!registry.damage(&mut world, castle, 19, &mut events));
    assert!(!registry.is_defeated());
    assert!(registry.damage(&mut world, castle, 1, &mut events));
    assert!(registry.is_defeated());

    let destroyed = events
        .iter()
        .filter(|e| matches!(e, SimEvent::StructureDestroyed { .. }))
        .count();
    assert_eq!(destroyed, 1);

    events.clear();
    assert!(!registry.damage(&mut world, castle, 5, &mut events));
    assert!(!registry.destroy(&mut world, castle, &mut events));
    assert!(events.is_empty(), "damage after destruction is a no-op");
    assert!(registry.is_defeated());
    assert!(registry.castle(&world).is_none());
    assert!(entity_of(castle).map_or(true, |e| !world.contains(e)));
}

#[test]
fn test_destroyed_target_stops_resolving() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let wall = registry
        .create(&mut world, StructureKind::Wall, 0.0, GROUND_Y)
        .unwrap();
    let target = bastion_core::components::TargetRef {
        key: wall,
        kind: TargetKind::Structure,
    };
    assert!(directory::resolve_target(&world, target).is_some());

    registry.destroy(&mut world, wall, &mut Vec::new());
    assert!(directory::resolve_target(&world, target).is_none());
}

#[test]
fn test_farm_produces_one_coin_per_interval() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let mut ledger = Ledger::new(0);
    let mut events = Vec::new();
    registry
        .create(&mut world, StructureKind::Farm, 1000.0, GROUND_Y)
        .unwrap();

    for now in [0.0, 5000.0, 9999.0] {
        registry.tick(&mut world, &mut ledger, &queries(now, 0, &[]), &mut events);
    }
    assert_eq!(ledger.pickup_count(), 0);

    registry.tick(&mut world, &mut ledger, &queries(10_000.0, 0, &[]), &mut events);
    assert_eq!(ledger.pickup_count(), 1);
    registry.tick(&mut world, &mut ledger, &queries(10_001.0, 0, &[]), &mut events);
    assert_eq!(ledger.pickup_count(), 1);
    registry.tick(&mut world, &mut ledger, &queries(20_000.0, 0, &[]), &mut events);
    assert_eq!(ledger.pickup_count(), 2);

    let pickup = ledger.pickups().next().unwrap();
    assert_eq!(pickup.value, FARM_COIN_VALUE);
    assert_eq!(pickup.position, Position::new(1000.0, GROUND_Y - PRODUCTION_DROP_LIFT));
    assert_eq!(ledger.balance(), 0, "production drops coins, it does not credit");
}

#[test]
fn test_farm_never_produces_twice_in_one_tick() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let mut ledger = Ledger::new(0);
    let mut events = Vec::new();
    registry
        .create(&mut world, StructureKind::Farm, 1000.0, GROUND_Y)
        .unwrap();

    registry.tick(&mut world, &mut ledger, &queries(0.0, 0, &[]), &mut events);
    registry.tick(&mut world, &mut ledger, &queries(95_000.0, 0, &[]), &mut events);
    assert_eq!(ledger.pickup_count(), 1);
}

#[test]
fn test_mine_drops_two_value_coin() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let mut ledger = Ledger::new(0);
    let mut events = Vec::new();
    registry
        .create(&mut world, StructureKind::Mine, 2000.0, GROUND_Y)
        .unwrap();

    registry.tick(&mut world, &mut ledger, &queries(100.0, 0, &[]), &mut events);
    registry.tick(&mut world, &mut ledger, &queries(15_000.0, 0, &[]), &mut events);
    assert_eq!(ledger.pickup_count(), 0);
    registry.tick(&mut world, &mut ledger, &queries(15_100.0, 0, &[]), &mut events);

    let pickup = ledger.pickups().next().unwrap();
    assert_eq!(pickup.value, MINE_COIN_VALUE);
    assert_eq!(pickup.position.x, 2000.0 + MINE_DROP_OFFSET_X);
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::CoinProduced {
            kind: StructureKind::Mine,
            value: 2,
            ..
        }
    )));
}

#[test]
fn test_recruitment_respects_population_cap() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let mut ledger = Ledger::new(0);
    let mut events = Vec::new();
    registry
        .create(&mut world, StructureKind::RecruitmentHut, 3000.0, GROUND_Y)
        .unwrap();
    assert_eq!(population_cap(1), 11);

    registry.tick(&mut world, &mut ledger, &queries(0.0, 11, &[]), &mut events);
    let orders = registry.tick(&mut world, &mut ledger, &queries(20_000.0, 11, &[]), &mut events);
    assert!(orders.is_empty(), "full settlement skips recruitment");

    // The skipped slot is not queued up for later.
    let orders = registry.tick(&mut world, &mut ledger, &queries(20_500.0, 3, &[]), &mut events);
    assert!(orders.is_empty());

    let orders = registry.tick(&mut world, &mut ledger, &queries(40_000.0, 10, &[]), &mut events);
    assert_eq!(orders, vec![SpawnOrder::Villager { x: 3000.0 }]);
}

#[test]
fn test_tower_tracks_without_damage() {
    let mut world = World::new();
    let mut registry = StructureRegistry::new(default_catalog());
    let mut ledger = Ledger::new(0);
    let mut events = Vec::new();
    let tower = registry
        .create(&mut world, StructureKind::Tower, 1000.0, GROUND_Y)
        .unwrap();

    let enemies = [
        Sighting::new(EntityKey(1), TargetKind::Enemy, Position::new(1200.0, GROUND_Y)),
        Sighting::new(EntityKey(2), TargetKind::Enemy, Position::new(900.0, GROUND_Y)),
        Sighting::new(EntityKey(3), TargetKind::Enemy, Position::new(1300.0, GROUND_Y)),
    ];

    registry.tick(&mut world, &mut ledger, &queries(0.0, 0, &enemies), &mut events);
    registry.tick(&mut world, &mut ledger, &queries(500.0, 0, &enemies), &mut events);
    registry.tick(&mut world, &mut ledger, &queries(1000.0, 0, &enemies), &mut events);

    let tracker = *world
        .get::<&TowerTracker>(entity_of(tower).unwrap())
        .unwrap();
    assert_eq!(tracker.tracked, Some(EntityKey(2)));
    assert_eq!(tracker.shots_recorded, 2);
    assert_eq!(tracker.last_attack_ms, Some(1000.0));
    assert!(events.is_empty());

    registry.tick(&mut world, &mut ledger, &queries(5000.0, 0, &[]), &mut events);
    let tracker = *world
        .get::<&TowerTracker>(entity_of(tower).unwrap())
        .unwrap();
    assert_eq!(tracker.tracked, None);
    assert_eq!(tracker.shots_recorded, 2);
}

// ---- Enemies ----

#[test]
fn test_enemy_take_damage_and_death_once() {
    let mut world = World::new();
    let mut ledger = Ledger::new(0);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut events = Vec::new();
    let entity = world_setup::spawn_enemy(&mut world, &mut rng, 800.0, Facing::Left);
    let key = key_of(entity);

    assert!(!enemies::take_damage(&mut world, &mut ledger, &mut rng, key, 1, &mut events));
    assert_eq!(world.get::<&Enemy>(entity).unwrap().health, ENEMY_HEALTH - 1);
    assert_eq!(
        events.last(),
        Some(&SimEvent::EnemyDamaged {
            enemy: key,
            health: ENEMY_HEALTH - 1
        })
    );

    assert!(enemies::take_damage(&mut world, &mut ledger, &mut rng, key, 5, &mut events));
    assert!(!world.contains(entity));
    assert!(!enemies::take_damage(&mut world, &mut ledger, &mut rng, key, 1, &mut events));

    let deaths = events
        .iter()
        .filter(|e| matches!(e, SimEvent::EnemyDied { .. }))
        .count();
    assert_eq!(deaths, 1);
}

#[test]
fn test_enemy_coin_drop_is_a_coin_flip() {
    let mut world = World::new();
    let mut ledger = Ledger::new(0);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut events = Vec::new();

    for _ in 0..100 {
        let entity = world_setup::spawn_enemy(&mut world, &mut rng, 800.0, Facing::Left);
        let key = key_of(entity);
        enemies::take_damage(&mut world, &mut ledger, &mut rng, key, ENEMY_HEALTH, &mut events);
    }

    let drops = ledger.pickup_count();
    assert!(drops > 20 && drops < 80, "expected roughly half, got {drops}");
    for pickup in ledger.pickups() {
        assert_eq!(pickup.value, 1);
        assert_eq!(pickup.position.y, GROUND_Y - ENEMY_COIN_DROP_LIFT);
    }
}

// ---- Waves ----

#[test]
fn test_wave_size() {
    assert_eq!(wave_spawner::wave_size(1), 5);
    assert_eq!(wave_spawner::wave_size(5), 7);
    assert_eq!(wave_spawner::wave_size(30), 20);
    assert_eq!(wave_spawner::wave_size(100), 20);
}

#[test]
fn test_wave_spawn_positions_stay_inside_margins() {
    assert_eq!(wave_spawner::spawn_x(400.0, true, 10_000.0), 100.0);
    assert_eq!(wave_spawner::spawn_x(400.0, false, 10_000.0), 1400.0);
    assert_eq!(wave_spawner::spawn_x(9500.0, false, 10_000.0), 9900.0);
    assert_eq!(wave_spawner::spawn_x(5000.0, true, 10_000.0), 4000.0);
}

// ---- Engine ----

#[test]
fn test_start_game_founds_settlement() {
    let mut engine = SimulationEngine::new(GameConfig::default());
    engine.queue_command(PlayerCommand::StartGame);
    engine.advance(0.0);
    assert_eq!(engine.phase(), GamePhase::Active);

    // Coins scattered next to the player are swept up on the first tick.
    let swept = engine.ledger().balance() - STARTING_COINS;
    assert_eq!(engine.ledger().pickup_count() as u32 + swept, 20);
    assert_eq!(directory::villager_count(engine.world()), INITIAL_VILLAGERS);
    assert_eq!(directory::enemy_count(engine.world()), 0);

    let castle = engine.registry().castle(engine.world()).unwrap();
    assert_eq!(castle.position.x, CASTLE_START_X);
    let (_, player) = directory::player(engine.world()).unwrap();
    assert_eq!(player.x, PLAYER_START_X);

    for (_, villager) in engine.world().query::<&Villager>().iter() {
        assert!((villager.home_x - CASTLE_START_X).abs() <= INITIAL_VILLAGER_SPREAD);
    }
}

#[test]
fn test_lobby_does_not_advance() {
    let mut engine = SimulationEngine::new(GameConfig::default());
    let snapshot = engine.advance(1000.0);
    assert_eq!(snapshot.phase, GamePhase::Lobby);
    assert_eq!(snapshot.time.tick, 0);
    assert!(snapshot.player.is_none());
}

#[test]
fn test_determinism_same_seed() {
    let config = GameConfig {
        seed: 12345,
        day_duration_ms: 3000.0,
        ..Default::default()
    };
    let mut engine_a = started_engine(config.clone());
    let mut engine_b = started_engine(config);

    for i in 0..600 {
        if i == 30 {
            for engine in [&mut engine_a, &mut engine_b] {
                engine.queue_command(PlayerCommand::SetDirection {
                    direction: Some(Facing::Right),
                });
            }
        }
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = started_engine(GameConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = started_engine(GameConfig {
        seed: 222,
        ..Default::default()
    });

    let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
    let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
    assert_ne!(json_a, json_b, "Different seeds should scatter the settlement differently");
}

#[test]
fn test_pause_and_resume() {
    let mut engine = started_engine(GameConfig::default());
    engine.tick();
    let before = engine.time();

    engine.queue_command(PlayerCommand::Pause);
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.phase(), GamePhase::Paused);
    assert_eq!(engine.time(), before);

    engine.queue_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Active);
    assert_eq!(engine.time().tick, before.tick + 1);
}

#[test]
fn test_time_scale_clamped() {
    let mut engine = started_engine(GameConfig::default());
    engine.queue_command(PlayerCommand::SetTimeScale { scale: 10.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);

    engine.queue_command(PlayerCommand::SetTimeScale { scale: f64::NAN });
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);

    // The scale applies from the tick after the command.
    engine.queue_command(PlayerCommand::SetTimeScale { scale: -1.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 0.0);
    let before = engine.time().elapsed_ms;
    engine.tick();
    assert_eq!(engine.time().elapsed_ms, before);
}

#[test]
fn test_negative_delta_counts_as_zero() {
    let mut engine = started_engine(GameConfig::default());
    engine.advance(100.0);
    let before = engine.time().elapsed_ms;
    engine.advance(-50.0);
    engine.advance(f64::NAN);
    assert_eq!(engine.time().elapsed_ms, before);
}

#[test]
fn test_player_moves_and_clamps_to_world() {
    let mut engine = started_engine(GameConfig::default());
    engine.queue_command(PlayerCommand::SetDirection {
        direction: Some(Facing::Right),
    });
    let snapshot = engine.advance(1000.0);
    let player = snapshot.player.unwrap();
    assert_eq!(player.position.x, PLAYER_START_X + PLAYER_SPEED);
    assert_eq!(player.facing, Facing::Right);
    assert!(player.moving);

    engine.queue_command(PlayerCommand::SetDirection {
        direction: Some(Facing::Left),
    });
    let snapshot = engine.advance(10_000.0);
    assert_eq!(snapshot.player.unwrap().position.x, 0.0);

    engine.queue_command(PlayerCommand::SetDirection { direction: None });
    let snapshot = engine.advance(1000.0);
    let player = snapshot.player.unwrap();
    assert_eq!(player.position.x, 0.0);
    assert!(!player.moving);
    assert_eq!(player.facing, Facing::Left);
}

#[test]
fn test_player_collects_coins_once() {
    let mut engine = started_engine(GameConfig::default());
    clear_pickups(&mut engine);
    engine
        .ledger_mut()
        .create_pickup(PLAYER_START_X + 50.0, GROUND_Y, 2);
    engine
        .ledger_mut()
        .create_pickup(PLAYER_START_X - 100.0, GROUND_Y, 1);
    engine
        .ledger_mut()
        .create_pickup(PLAYER_START_X + 300.0, GROUND_Y, 5);

    let snapshot = engine.advance(16.0);
    assert_eq!(snapshot.coins, STARTING_COINS + 3);
    assert_eq!(snapshot.pickups.len(), 1);
    assert!(snapshot.events.contains(&SimEvent::CoinsCollected {
        amount: 3,
        balance: STARTING_COINS + 3
    }));

    let snapshot = engine.advance(16.0);
    assert_eq!(snapshot.coins, STARTING_COINS + 3);
    assert!(!snapshot
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::CoinsCollected { .. })));
}

#[test]
fn test_placement_rules() {
    let mut engine = started_engine(GameConfig::default());

    assert_eq!(
        engine.place_structure(StructureKind::Castle, 2000.0),
        Err(PlacementError::NotBuildable(StructureKind::Castle))
    );
    assert_eq!(
        engine.place_structure(StructureKind::Mine, 2000.0),
        Err(PlacementError::InsufficientCoins {
            kind: StructureKind::Mine,
            cost: 20,
            balance: STARTING_COINS,
        })
    );
    assert_eq!(
        engine.place_structure(StructureKind::Wall, CASTLE_START_X + 149.0),
        Err(PlacementError::TooClose {
            existing_x: CASTLE_START_X,
            min_spacing: STRUCTURE_MIN_SPACING,
        })
    );
    assert_eq!(engine.ledger().balance(), STARTING_COINS);

    let wall = engine
        .place_structure(StructureKind::Wall, CASTLE_START_X + 150.0)
        .unwrap();
    assert_eq!(engine.ledger().balance(), STARTING_COINS - 5);
    assert!(engine.registry().contains(wall));

    let snapshot = engine.advance(0.0);
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::StructureBuilt { kind: StructureKind::Wall, .. })));
    assert_eq!(snapshot.structures.len(), 2);
}

#[test]
fn test_rejected_placement_command_keeps_running() {
    let mut engine = started_engine(GameConfig::default());
    engine.queue_command(PlayerCommand::PlaceStructure {
        kind: StructureKind::Tower,
        x: 3000.0,
    });
    let snapshot = engine.tick();
    assert_eq!(snapshot.phase, GamePhase::Active);
    assert_eq!(snapshot.structures.len(), 1);
    assert_eq!(snapshot.coins, STARTING_COINS);
}

#[test]
fn test_enemy_attacks_adjacent_structure() {
    let mut engine = started_engine(GameConfig::default());
    let wall = engine.place_structure(StructureKind::Wall, 2000.0).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let enemy = world_setup::spawn_enemy(engine.world_mut(), &mut rng, 2030.0, Facing::Left);

    engine.advance(16.0);
    {
        let state = engine.world().get::<&Enemy>(enemy).unwrap();
        assert_eq!(state.state, EnemyState::Attack);
        assert_eq!(state.target.map(|t| t.key), Some(wall));
    }

    let snapshot = engine.advance(16.0);
    assert!(snapshot.events.contains(&SimEvent::EnemyHit {
        enemy: key_of(enemy),
        target: wall,
        target_kind: TargetKind::Structure,
    }));
    let view = snapshot.structures.iter().find(|s| s.key == wall).unwrap();
    assert_eq!(view.health, 9);

    // Cooldown holds the next hit back for a second.
    for _ in 0..10 {
        engine.advance(16.0);
    }
    let health = engine.registry().views(engine.world())[1].health;
    assert_eq!(health, 9);
    engine.advance(1000.0);
    let health = engine.registry().views(engine.world())[1].health;
    assert_eq!(health, 8);
}

#[test]
fn test_enemy_resumes_walking_after_target_destroyed() {
    let mut engine = started_engine(GameConfig::default());
    let wall = engine.place_structure(StructureKind::Wall, 2000.0).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let enemy = world_setup::spawn_enemy(engine.world_mut(), &mut rng, 2030.0, Facing::Left);

    engine.advance(16.0);
    assert!(engine.damage_structure(wall, 100));
    engine.advance(16.0);

    let state = engine.world().get::<&Enemy>(enemy).unwrap();
    assert_eq!(state.state, EnemyState::Walk);
}

#[test]
fn test_castle_loss_defeats_once() {
    let mut engine = started_engine(GameConfig::default());
    let castle = castle_key(&engine);

    assert!(engine.damage_structure(castle, 20));
    let snapshot = engine.advance(16.0);
    assert_eq!(snapshot.phase, GamePhase::Defeated);
    let defeats = snapshot
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::Defeated { .. }))
        .count();
    assert_eq!(defeats, 1);

    assert!(!engine.damage_structure(castle, 5));
    let tick = engine.time().tick;
    let snapshot = engine.advance(16.0);
    assert_eq!(snapshot.phase, GamePhase::Defeated);
    assert_eq!(snapshot.time.tick, tick, "defeat freezes the world");
    assert!(snapshot.events.is_empty());

    engine.queue_command(PlayerCommand::Resume);
    assert_eq!(engine.advance(16.0).phase, GamePhase::Defeated);
}

#[test]
fn test_castle_lost_between_ticks_defeats_before_next_tick() {
    let mut engine = started_engine(GameConfig::default());
    let castle = castle_key(&engine);
    let tick = engine.time().tick;

    assert!(engine.damage_structure(castle, 20));
    let snapshot = engine.advance(16.0);
    assert_eq!(snapshot.phase, GamePhase::Defeated);
    assert_eq!(snapshot.time.tick, tick, "no tick runs without a castle");
    assert_eq!(
        snapshot.events.iter().filter(|e| matches!(e, SimEvent::Defeated { .. })).count(),
        1
    );
}

#[test]
fn test_castle_lost_while_paused_stays_defeated() {
    let mut engine = started_engine(GameConfig::default());
    let castle = castle_key(&engine);
    engine.queue_command(PlayerCommand::Pause);
    engine.advance(16.0);
    let tick = engine.time().tick;

    assert!(engine.damage_structure(castle, 20));
    engine.queue_command(PlayerCommand::Resume);
    let snapshot = engine.advance(16.0);
    assert_eq!(snapshot.phase, GamePhase::Defeated);
    assert_eq!(snapshot.time.tick, tick);
    assert!(snapshot.events.contains(&SimEvent::Defeated { day_count: 1 }));
    assert!(snapshot.enemies.is_empty());
}

#[test]
fn test_second_enemy_sees_wall_destroyed_this_tick() {
    let mut engine = started_engine(GameConfig::default());
    let wall = engine.place_structure(StructureKind::Wall, 2000.0).unwrap();
    assert!(!engine.damage_structure(wall, 9));

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let right = world_setup::spawn_enemy(engine.world_mut(), &mut rng, 2030.0, Facing::Left);
    let left = world_setup::spawn_enemy(engine.world_mut(), &mut rng, 1970.0, Facing::Right);
    let states = |engine: &SimulationEngine| {
        [right, left].map(|e| engine.world().get::<&Enemy>(e).unwrap().state)
    };

    engine.advance(16.0);
    assert_eq!(states(&engine), [EnemyState::Attack, EnemyState::Attack]);

    let snapshot = engine.advance(16.0);
    let destroyed = snapshot
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::StructureDestroyed { .. }))
        .count();
    let hits = snapshot
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::EnemyHit { .. }))
        .count();
    assert_eq!(destroyed, 1);
    assert_eq!(hits, 1, "the wall falls to the first blow only");
    assert!(!engine.registry().contains(wall));
    assert_eq!(
        states(&engine).iter().filter(|s| **s == EnemyState::Walk).count(),
        1
    );

    engine.advance(16.0);
    assert_eq!(states(&engine), [EnemyState::Walk, EnemyState::Walk]);
}

#[test]
fn test_castle_health_tier_in_snapshot() {
    let mut engine = started_engine(GameConfig::default());
    let castle = castle_key(&engine);
    engine.damage_structure(castle, 10);
    let snapshot = engine.advance(0.0);
    let view = &snapshot.structures[0];
    assert_eq!(view.health_ratio, 0.5);
    assert_eq!(view.health_tier, HealthTier::Yellow);
}

#[test]
fn test_night_spawns_wave() {
    let mut engine = started_engine(GameConfig {
        day_duration_ms: 1000.0,
        ..Default::default()
    });

    let snapshot = engine.advance(1000.0);
    assert_eq!(snapshot.clock.phase, DayPhase::Night);
    assert!(snapshot
        .events
        .contains(&SimEvent::NightStarted { day_count: 1 }));
    assert!(snapshot
        .events
        .contains(&SimEvent::WaveSpawned { day_count: 1, size: 5 }));
    assert_eq!(snapshot.enemies.len(), 5);

    for enemy in &snapshot.enemies {
        let left = enemy.position.x < CASTLE_START_X;
        let expected = if left { Facing::Right } else { Facing::Left };
        assert_eq!(enemy.facing, expected, "wave walks toward the castle");
    }

    let snapshot = engine.advance(500.0);
    assert!(snapshot.events.contains(&SimEvent::DayStarted { day_count: 2 }));
    assert_eq!(snapshot.clock.day_count, 2);
}

#[test]
fn test_night_subscribers_fire_from_engine() {
    let fired = Arc::new(Mutex::new(0));
    let mut engine = started_engine(GameConfig {
        day_duration_ms: 1000.0,
        ..Default::default()
    });
    let counter = Arc::clone(&fired);
    engine.subscribe_night_start(move |_| *counter.lock().unwrap() += 1);

    engine.advance(999.0);
    assert_eq!(*fired.lock().unwrap(), 0);
    engine.advance(1.0);
    assert_eq!(*fired.lock().unwrap(), 1);
}

#[test]
fn test_recruitment_hut_spawns_villager() {
    let mut engine = started_engine(GameConfig::default());
    engine
        .place_structure(StructureKind::RecruitmentHut, 1500.0)
        .unwrap();

    engine.advance(16.0);
    let snapshot = engine.advance(RECRUIT_INTERVAL_MS);
    assert_eq!(snapshot.villagers.len(), INITIAL_VILLAGERS as usize + 1);
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::VillagerSpawned { position, .. } if position.x == 1500.0)));
}

#[test]
fn test_set_villager_role() {
    let mut engine = started_engine(GameConfig::default());
    let villager = engine.advance(0.0).villagers[0].key;

    engine.queue_command(PlayerCommand::SetVillagerRole {
        villager,
        role: VillagerRole::Archer,
    });
    let snapshot = engine.advance(16.0);
    let view = snapshot.villagers.iter().find(|v| v.key == villager).unwrap();
    assert_eq!(view.role, VillagerRole::Archer);

    // Unknown keys are ignored.
    engine.queue_command(PlayerCommand::SetVillagerRole {
        villager: castle_key(&engine),
        role: VillagerRole::Farmer,
    });
    assert_eq!(engine.advance(16.0).phase, GamePhase::Active);
}

#[test]
fn test_villagers_flee_at_night() {
    let mut engine = started_engine(GameConfig {
        day_duration_ms: 1000.0,
        ..Default::default()
    });
    let villager = engine.advance(0.0).villagers[0].key;
    let home = engine
        .world()
        .get::<&Villager>(entity_of(villager).unwrap())
        .unwrap()
        .home_x;

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    world_setup::spawn_enemy(engine.world_mut(), &mut rng, home + 150.0, Facing::Left);

    // Let night fall; the flee check runs in the same tick.
    let snapshot = engine.advance(1000.0);
    let view = snapshot.villagers.iter().find(|v| v.key == villager).unwrap();
    assert!(view.fleeing);
    assert_eq!(view.state, VillagerState::Walk);
}

#[test]
fn test_snapshot_serializes() {
    let mut engine = started_engine(GameConfig::default());
    let snapshot = engine.tick();
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"structures\""));
    assert!(json.contains("\"castle\""));
}
