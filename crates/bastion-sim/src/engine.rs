//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs world, the clock, the ledger and the
//! structure registry, processes player commands, runs all systems in a
//! fixed order and produces `GameStateSnapshot`s. Completely headless, so a
//! whole session can be replayed deterministically in tests.

use std::collections::VecDeque;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bastion_core::commands::PlayerCommand;
use bastion_core::config::GameConfig;
use bastion_core::constants::*;
use bastion_core::enums::{GamePhase, StructureKind};
use bastion_core::error::PlacementError;
use bastion_core::events::SimEvent;
use bastion_core::state::GameStateSnapshot;
use bastion_core::types::{sanitize_delta_ms, EntityKey, Position, SimTime};

use crate::clock::{Clock, PhaseTransition};
use crate::directory::{self, key_of};
use crate::ledger::Ledger;
use crate::structures::{SpawnOrder, StructureQueries, StructureRegistry};
use crate::systems;
use crate::systems::snapshot::SnapshotSources;
use crate::world_setup;

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    config: GameConfig,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    clock: Clock,
    ledger: Ledger,
    registry: StructureRegistry,
    command_queue: VecDeque<PlayerCommand>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config. The world stays
    /// empty until `StartGame`.
    pub fn new(config: GameConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale: config.time_scale,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            clock: Clock::new(config.day_duration_ms),
            ledger: Ledger::new(config.starting_coins),
            registry: StructureRegistry::new(config.catalog.clone()),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            config,
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance by one fixed tick, scaled by the current time scale.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.advance(TICK_MS * self.time_scale)
    }

    /// Advance the simulation by `delta_ms` and return the resulting snapshot.
    /// Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, delta_ms: f64) -> GameStateSnapshot {
        self.process_commands();
        // The castle may have fallen between ticks.
        self.check_defeat();

        if self.phase == GamePhase::Active {
            self.run_systems(sanitize_delta_ms(delta_ms));
        }

        self.snapshot()
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn registry(&self) -> &StructureRegistry {
        &self.registry
    }

    /// Register a callback run when a new day starts.
    pub fn subscribe_day_start(
        &mut self,
        callback: impl FnMut(&PhaseTransition) + Send + 'static,
    ) {
        self.clock.subscribe_day_start(callback);
    }

    /// Register a callback run when night falls, before the wave arrives.
    pub fn subscribe_night_start(
        &mut self,
        callback: impl FnMut(&PhaseTransition) + Send + 'static,
    ) {
        self.clock.subscribe_night_start(callback);
    }

    /// Place a structure for the player: the kind must have a build cost,
    /// the ledger must cover it and no structure may stand within the
    /// minimum spacing. The cost is paid only once the structure exists.
    pub fn place_structure(
        &mut self,
        kind: StructureKind,
        x: f64,
    ) -> Result<EntityKey, PlacementError> {
        let cost = *self
            .config
            .build_costs
            .get(&kind)
            .ok_or(PlacementError::NotBuildable(kind))?;

        if !self.ledger.can_afford(cost) {
            return Err(PlacementError::InsufficientCoins {
                kind,
                cost,
                balance: self.ledger.balance(),
            });
        }

        if let Some(blocker) = self
            .registry
            .all(&self.world)
            .into_iter()
            .find(|s| (s.position.x - x).abs() < STRUCTURE_MIN_SPACING)
        {
            return Err(PlacementError::TooClose {
                existing_x: blocker.position.x,
                min_spacing: STRUCTURE_MIN_SPACING,
            });
        }

        let key = self.registry.create(&mut self.world, kind, x, GROUND_Y)?;
        self.ledger.spend(cost);
        self.events.push(SimEvent::StructureBuilt {
            structure: key,
            kind,
            position: Position::new(x, GROUND_Y),
        });
        tracing::info!(%kind, x, cost, balance = self.ledger.balance(), "structure placed");
        Ok(key)
    }

    /// Damage a structure. Returns `true` if it was destroyed by this call.
    pub fn damage_structure(&mut self, key: EntityKey, amount: i32) -> bool {
        self.registry.damage(&mut self.world, key, amount, &mut self.events)
    }

    /// Damage an enemy. Returns `true` if it died from this call.
    pub fn damage_enemy(&mut self, key: EntityKey, amount: i32) -> bool {
        systems::enemies::take_damage(
            &mut self.world,
            &mut self.ledger,
            &mut self.rng,
            key,
            amount,
            &mut self.events,
        )
    }

    /// Spawn a night wave immediately, as if night had just fallen.
    pub fn spawn_wave(&mut self) -> u32 {
        let day_count = self.clock.day_count();
        let castle_x = self.registry.castle(&self.world).map(|c| c.position.x);
        let size = systems::wave_spawner::spawn_wave(
            &mut self.world,
            &mut self.rng,
            day_count,
            self.config.world_size,
            castle_x,
        );
        self.events.push(SimEvent::WaveSpawned { day_count, size });
        size
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartGame => {
                if self.phase == GamePhase::Lobby {
                    match world_setup::setup_settlement(
                        &mut self.world,
                        &mut self.registry,
                        &mut self.ledger,
                        &mut self.rng,
                        &self.config,
                    ) {
                        Ok(()) => self.phase = GamePhase::Active,
                        Err(err) => tracing::error!(%err, "failed to found settlement"),
                    }
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SetTimeScale { scale } => {
                if scale.is_finite() {
                    self.time_scale = scale.clamp(0.0, MAX_TIME_SCALE);
                }
            }
            PlayerCommand::SetDirection { direction } => {
                systems::player::set_direction(&mut self.world, direction);
            }
            PlayerCommand::PlaceStructure { kind, x } => {
                if !matches!(self.phase, GamePhase::Active | GamePhase::Paused) {
                    tracing::warn!(%kind, phase = ?self.phase, "placement ignored outside play");
                    return;
                }
                if let Err(err) = self.place_structure(kind, x) {
                    tracing::warn!(%kind, x, %err, "placement rejected");
                }
            }
            PlayerCommand::SetVillagerRole { villager, role } => {
                if !systems::villagers::set_role(&mut self.world, villager, role) {
                    tracing::warn!(?villager, ?role, "role change for unknown villager");
                }
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, delta_ms: f64) {
        self.time.advance(delta_ms);

        // 1. Clock, and the night wave if night just fell
        if let Some(transition) = self.clock.advance(delta_ms) {
            self.on_phase_transition(transition);
        }
        // 2. Player movement + coin pickup
        systems::player::run(&mut self.world, &mut self.ledger, &mut self.events);
        // 3. Villagers
        systems::villagers::run(
            &mut self.world,
            &mut self.rng,
            delta_ms,
            self.clock.is_night(),
        );
        // 4. Enemies
        systems::enemies::run(&mut self.world, &mut self.registry, delta_ms, &mut self.events);
        // 5. Structures
        self.run_structures();
        // 6. Movement integration
        systems::movement::run(&mut self.world, delta_ms, self.config.world_size);
        // 7. Defeat check
        self.check_defeat();
    }

    /// Enter `Defeated` once the castle is gone. Only a running or paused
    /// game can be lost, so the event fires once.
    fn check_defeat(&mut self) {
        if !self.registry.is_defeated()
            || !matches!(self.phase, GamePhase::Active | GamePhase::Paused)
        {
            return;
        }
        let day_count = self.clock.day_count();
        self.phase = GamePhase::Defeated;
        self.events.push(SimEvent::Defeated { day_count });
        tracing::warn!(day_count, tick = self.time.tick, "settlement defeated");
    }

    fn run_structures(&mut self) {
        let enemies = directory::enemy_sightings(&self.world);
        let queries = StructureQueries {
            now_ms: self.time.elapsed_ms,
            day_count: self.clock.day_count(),
            villager_count: directory::villager_count(&self.world),
            enemies: &enemies,
        };
        let orders = self
            .registry
            .tick(&mut self.world, &mut self.ledger, &queries, &mut self.events);

        for order in orders {
            match order {
                SpawnOrder::Villager { x } => {
                    let entity = world_setup::spawn_villager(&mut self.world, &mut self.rng, x);
                    self.events.push(SimEvent::VillagerSpawned {
                        villager: key_of(entity),
                        position: Position::new(x, GROUND_Y),
                    });
                    tracing::debug!(x, "villager recruited");
                }
            }
        }
    }

    fn on_phase_transition(&mut self, transition: PhaseTransition) {
        match transition {
            PhaseTransition::NightStarted { day_count } => {
                tracing::info!(day_count, "night falls");
                self.events.push(SimEvent::NightStarted { day_count });
                self.spawn_wave();
            }
            PhaseTransition::DayStarted { day_count } => {
                tracing::info!(day_count, "day breaks");
                self.events.push(SimEvent::DayStarted { day_count });
            }
        }
    }

    fn snapshot(&mut self) -> GameStateSnapshot {
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &SnapshotSources {
                world: &self.world,
                time: self.time,
                phase: self.phase,
                clock: &self.clock,
                ledger: &self.ledger,
                registry: &self.registry,
            },
            events,
        )
    }
}
