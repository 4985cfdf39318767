//! Simulation constants and tuning parameters.
//!
//! Times are in milliseconds, distances in world units (pixels).

/// Nominal frame rate of the headless loop (Hz).
pub const TICK_RATE: u32 = 60;

/// Milliseconds per nominal tick.
pub const TICK_MS: f64 = 1000.0 / TICK_RATE as f64;

/// Fastest allowed simulation speed multiplier.
pub const MAX_TIME_SCALE: f64 = 4.0;

// --- World ---

/// Total world width. Actors are clamped to [0, WORLD_SIZE].
pub const WORLD_SIZE: f64 = 10_000.0;

/// Ground line that actors stand on.
pub const GROUND_Y: f64 = 520.0;

/// Castle x position at settlement start.
pub const CASTLE_START_X: f64 = 400.0;

/// Player x position at settlement start.
pub const PLAYER_START_X: f64 = 400.0;

/// Number of villagers created around the castle.
pub const INITIAL_VILLAGERS: u32 = 3;

/// Horizontal scatter of the starting villagers around the castle.
pub const INITIAL_VILLAGER_SPREAD: f64 = 100.0;

/// Coins in the ledger at settlement start.
pub const STARTING_COINS: u32 = 10;

/// One seeded pickup per this many units of world width.
pub const SEED_PICKUP_SPACING: f64 = 500.0;

/// Seeded pickups stay this far from either world edge.
pub const SEED_PICKUP_MARGIN: f64 = 100.0;

// --- Clock ---

/// Default day length (3 minutes).
pub const DAY_DURATION_MS: f64 = 180_000.0;

/// Night length as a fraction of the day.
pub const NIGHT_FRACTION: f64 = 0.5;

/// Portion of one full day+night cycle occupied by the day.
pub const DAY_CYCLE_SHARE: f64 = 0.66;

/// Maximum sky darkness reached by sunset.
pub const SUNSET_DARKNESS: f64 = 0.5;

// --- Player ---

/// Player ride speed (units/s).
pub const PLAYER_SPEED: f64 = 300.0;

/// Radius in which the player picks up coins.
pub const COIN_COLLECTION_RADIUS: f64 = 100.0;

// --- Enemies ---

pub const ENEMY_HEALTH: i32 = 3;
pub const ENEMY_MIN_SPEED: f64 = 60.0;
pub const ENEMY_MAX_SPEED: f64 = 100.0;

/// Distance at which an enemy starts hitting a structure.
pub const ENEMY_ATTACK_RANGE: f64 = 40.0;

/// Distance at which an enemy notices the player or a villager.
pub const ENEMY_DETECTION_RANGE: f64 = 200.0;

/// Damage per enemy hit.
pub const ENEMY_ATTACK_DAMAGE: i32 = 1;

/// Time between enemy hits.
pub const ENEMY_ATTACK_COOLDOWN_MS: f64 = 1000.0;

/// Chance that a dying enemy leaves a coin behind.
pub const ENEMY_COIN_DROP_CHANCE: f64 = 0.5;

/// Dropped coins appear slightly above the corpse.
pub const ENEMY_COIN_DROP_LIFT: f64 = 20.0;

// --- Waves ---

pub const WAVE_BASE_SIZE: u32 = 5;
pub const WAVE_MAX_SIZE: u32 = 20;

/// Distance from the player at which wave enemies appear.
pub const WAVE_SPAWN_OFFSET: f64 = 1000.0;

/// Wave enemies never appear closer than this to a world edge.
pub const WAVE_EDGE_MARGIN: f64 = 100.0;

// --- Villagers ---

pub const VILLAGER_SPEED: f64 = 100.0;
pub const VILLAGER_FLEE_SPEED: f64 = 150.0;
pub const VILLAGER_MIN_TIMER_MS: u32 = 2000;
pub const VILLAGER_MAX_TIMER_MS: u32 = 5000;

/// Distance from home after which a walking villager turns back.
pub const VILLAGER_WANDER_RANGE: f64 = 200.0;

/// Radius in which archers square up to enemies.
pub const ARCHER_ALERT_RANGE: f64 = 300.0;

/// Radius in which villagers run from enemies at night.
pub const VILLAGER_FLEE_RANGE: f64 = 200.0;

/// Base population cap before the day-count bonus.
pub const POPULATION_CAP_BASE: u32 = 10;

// --- Structures ---

/// Minimum horizontal spacing between placed structures.
pub const STRUCTURE_MIN_SPACING: f64 = 150.0;

pub const FARM_INTERVAL_MS: f64 = 10_000.0;
pub const FARM_COIN_VALUE: u32 = 1;

pub const MINE_INTERVAL_MS: f64 = 15_000.0;
pub const MINE_COIN_VALUE: u32 = 2;

pub const RECRUIT_INTERVAL_MS: f64 = 20_000.0;

/// Produced coins appear this far above the structure base.
pub const PRODUCTION_DROP_LIFT: f64 = 40.0;

/// Mine coins appear slightly left of the mine.
pub const MINE_DROP_OFFSET_X: f64 = -10.0;

/// Tower engagement radius.
pub const TOWER_RANGE: f64 = 250.0;

/// Minimum time between recorded tower shots.
pub const TOWER_ATTACK_INTERVAL_MS: f64 = 1000.0;
