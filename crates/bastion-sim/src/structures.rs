//! Structure registry.
//!
//! Structures are hecs entities carrying a `Structure` component plus the
//! per-kind state their behavior needs (`ProductionTimer` for farms, mines
//! and huts, `TowerTracker` for towers). The registry owns their lifecycle:
//! it is the only code that spawns, damages or despawns them, and it keeps
//! the live set in creation order so every traversal is stable.

use std::collections::BTreeMap;

use hecs::{Entity, EntityBuilder, World};

use bastion_ai::sensing::{nearest_within, Sighting};
use bastion_core::components::{ProductionTimer, Structure, TowerTracker};
use bastion_core::config::StructureSpec;
use bastion_core::constants::*;
use bastion_core::enums::{HealthTier, StructureKind, TargetKind};
use bastion_core::error::SimError;
use bastion_core::events::SimEvent;
use bastion_core::state::StructureView;
use bastion_core::types::{EntityKey, Position};

use crate::directory::{entity_of, key_of};
use crate::ledger::Ledger;

/// Read-only world state a structure may look at during its update.
pub struct StructureQueries<'a> {
    /// Monotonic simulation time.
    pub now_ms: f64,
    pub day_count: u32,
    pub villager_count: u32,
    /// Live enemies.
    pub enemies: &'a [Sighting],
}

/// Work a structure asks the engine to carry out after the structure pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOrder {
    /// A recruitment hut produced a villager at `x`.
    Villager { x: f64 },
}

/// Catalog plus live set of structures.
#[derive(Debug, Clone)]
pub struct StructureRegistry {
    catalog: BTreeMap<StructureKind, StructureSpec>,
    live: Vec<Entity>,
    castle: Option<EntityKey>,
    defeated: bool,
}

/// Villager cap for the given day.
pub fn population_cap(day_count: u32) -> u32 {
    POPULATION_CAP_BASE + day_count
}

impl StructureRegistry {
    pub fn new(catalog: BTreeMap<StructureKind, StructureSpec>) -> Self {
        Self {
            catalog,
            live: Vec::new(),
            castle: None,
            defeated: false,
        }
    }

    /// Build a structure of `kind` at `(x, y)` with full health.
    pub fn create(
        &mut self,
        world: &mut World,
        kind: StructureKind,
        x: f64,
        y: f64,
    ) -> Result<EntityKey, SimError> {
        let spec = *self
            .catalog
            .get(&kind)
            .ok_or_else(|| SimError::UnknownStructureType(kind.as_str().to_string()))?;

        let mut builder = EntityBuilder::new();
        builder.add(Structure {
            kind,
            health: spec.health,
            max_health: spec.health,
            width: spec.width,
            height: spec.height,
        });
        builder.add(Position::new(x, y));
        match kind {
            StructureKind::Farm | StructureKind::Mine | StructureKind::RecruitmentHut => {
                builder.add(ProductionTimer::default());
            }
            StructureKind::Tower | StructureKind::ArcherTower => {
                builder.add(TowerTracker::default());
            }
            StructureKind::Castle | StructureKind::Wall => {}
        }

        let entity = world.spawn(builder.build());
        let key = key_of(entity);
        self.live.push(entity);
        if kind == StructureKind::Castle && self.castle.is_none() {
            self.castle = Some(key);
        }
        tracing::debug!(%kind, x, "structure created");
        Ok(key)
    }

    /// Build a structure from its catalog name.
    pub fn create_named(
        &mut self,
        world: &mut World,
        name: &str,
        x: f64,
        y: f64,
    ) -> Result<EntityKey, SimError> {
        let kind: StructureKind = name.parse()?;
        self.create(world, kind, x, y)
    }

    /// Whether `key` is a structure in the live set.
    pub fn contains(&self, key: EntityKey) -> bool {
        entity_of(key).is_some_and(|entity| self.live.contains(&entity))
    }

    /// Subtract `amount` health. Destroys the structure when health reaches
    /// zero. Returns `true` if this call destroyed it. Damage to a structure
    /// that is already gone does nothing.
    pub fn damage(
        &mut self,
        world: &mut World,
        key: EntityKey,
        amount: i32,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        if !self.contains(key) {
            return false;
        }
        let Some(entity) = entity_of(key) else {
            return false;
        };
        let (kind, health, max_health) = match world.get::<&mut Structure>(entity) {
            Ok(mut structure) => {
                structure.health -= amount;
                (structure.kind, structure.health, structure.max_health)
            }
            Err(_) => return false,
        };

        events.push(SimEvent::StructureDamaged {
            structure: key,
            kind,
            health,
            max_health,
        });

        if health <= 0 {
            self.destroy(world, key, events)
        } else {
            false
        }
    }

    /// Run the kind's destroy behavior and remove the structure. The castle
    /// raises the defeat flag. Returns `false` if it was already gone.
    pub fn destroy(
        &mut self,
        world: &mut World,
        key: EntityKey,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        let Some(entity) = entity_of(key) else {
            return false;
        };
        let Some(index) = self.live.iter().position(|e| *e == entity) else {
            return false;
        };
        self.live.remove(index);

        let kind = world.get::<&Structure>(entity).map(|s| s.kind).ok();
        let position = world
            .get::<&Position>(entity)
            .map(|p| *p)
            .unwrap_or_default();

        if let Some(kind) = kind {
            match kind {
                StructureKind::Castle => {
                    self.defeated = true;
                    tracing::warn!(x = position.x, "castle destroyed");
                }
                _ => tracing::info!(%kind, x = position.x, "structure destroyed"),
            }
            events.push(SimEvent::StructureDestroyed {
                structure: key,
                kind,
                position,
            });
        }

        let _ = world.despawn(entity);
        true
    }

    /// Per-structure update for one tick, in creation order.
    ///
    /// Coins go straight into the ledger's pickup set. Villagers cannot be
    /// spawned from here, so huts return spawn orders instead.
    pub fn tick(
        &self,
        world: &mut World,
        ledger: &mut Ledger,
        queries: &StructureQueries<'_>,
        events: &mut Vec<SimEvent>,
    ) -> Vec<SpawnOrder> {
        let mut orders = Vec::new();
        let cap = population_cap(queries.day_count);

        for &entity in &self.live {
            let Ok(structure) = world.get::<&Structure>(entity).map(|s| *s) else {
                continue;
            };
            let Ok(position) = world.get::<&Position>(entity).map(|p| *p) else {
                continue;
            };

            match structure.kind {
                StructureKind::Farm => {
                    if production_due(world, entity, queries.now_ms, FARM_INTERVAL_MS) {
                        drop_coin(
                            ledger,
                            events,
                            structure.kind,
                            position.x,
                            position.y,
                            FARM_COIN_VALUE,
                        );
                    }
                }
                StructureKind::Mine => {
                    if production_due(world, entity, queries.now_ms, MINE_INTERVAL_MS) {
                        drop_coin(
                            ledger,
                            events,
                            structure.kind,
                            position.x + MINE_DROP_OFFSET_X,
                            position.y,
                            MINE_COIN_VALUE,
                        );
                    }
                }
                StructureKind::RecruitmentHut => {
                    if production_due(world, entity, queries.now_ms, RECRUIT_INTERVAL_MS) {
                        let population = queries.villager_count + orders.len() as u32;
                        if population < cap {
                            orders.push(SpawnOrder::Villager { x: position.x });
                        } else {
                            tracing::debug!(population, cap, "recruitment skipped, settlement full");
                        }
                    }
                }
                StructureKind::Tower | StructureKind::ArcherTower => {
                    track_enemies(world, entity, &position, queries);
                }
                StructureKind::Castle | StructureKind::Wall => {}
            }
        }

        orders
    }

    /// Live structures in creation order.
    pub fn all(&self, world: &World) -> Vec<Sighting> {
        self.live
            .iter()
            .filter_map(|&entity| {
                let position = *world.get::<&Position>(entity).ok()?;
                Some(Sighting::new(key_of(entity), TargetKind::Structure, position))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// The castle, while it stands.
    pub fn castle(&self, world: &World) -> Option<Sighting> {
        let key = self.castle?;
        if !self.contains(key) {
            return None;
        }
        let position = *world.get::<&Position>(entity_of(key)?).ok()?;
        Some(Sighting::new(key, TargetKind::Structure, position))
    }

    /// Set once the castle has been destroyed. Never cleared.
    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn views(&self, world: &World) -> Vec<StructureView> {
        self.live
            .iter()
            .filter_map(|&entity| {
                let structure = *world.get::<&Structure>(entity).ok()?;
                let position = *world.get::<&Position>(entity).ok()?;
                let ratio = if structure.max_health > 0 {
                    (structure.health.max(0) as f64) / structure.max_health as f64
                } else {
                    0.0
                };
                Some(StructureView {
                    key: key_of(entity),
                    kind: structure.kind,
                    position,
                    width: structure.width,
                    height: structure.height,
                    health: structure.health,
                    max_health: structure.max_health,
                    health_ratio: ratio,
                    health_tier: HealthTier::from_ratio(ratio),
                })
            })
            .collect()
    }
}

/// Stamp the timer on first sight, then report `true` at most once per call
/// whenever `interval_ms` has passed since the last production.
fn production_due(world: &World, entity: Entity, now_ms: f64, interval_ms: f64) -> bool {
    let Ok(mut timer) = world.get::<&mut ProductionTimer>(entity) else {
        return false;
    };
    match timer.last_production_ms {
        None => {
            timer.last_production_ms = Some(now_ms);
            false
        }
        Some(last) if now_ms - last >= interval_ms => {
            timer.last_production_ms = Some(now_ms);
            true
        }
        Some(_) => false,
    }
}

fn drop_coin(
    ledger: &mut Ledger,
    events: &mut Vec<SimEvent>,
    kind: StructureKind,
    x: f64,
    y: f64,
    value: u32,
) {
    let position = Position::new(x, y - PRODUCTION_DROP_LIFT);
    ledger.create_pickup(position.x, position.y, value);
    events.push(SimEvent::CoinProduced {
        kind,
        position,
        value,
    });
}

/// Follow the nearest enemy in range and log a shot on the attack interval.
/// Shots are bookkeeping only and never hurt the enemy.
fn track_enemies(
    world: &World,
    entity: Entity,
    position: &Position,
    queries: &StructureQueries<'_>,
) {
    let Ok(mut tracker) = world.get::<&mut TowerTracker>(entity) else {
        return;
    };
    let nearest = nearest_within(position, queries.enemies, TOWER_RANGE)
        .first()
        .map(|(_, sighting)| sighting.key);
    tracker.tracked = nearest;

    if nearest.is_none() {
        return;
    }
    let ready = tracker
        .last_attack_ms
        .is_none_or(|last| queries.now_ms - last >= TOWER_ATTACK_INTERVAL_MS);
    if ready {
        tracker.last_attack_ms = Some(queries.now_ms);
        tracker.shots_recorded += 1;
    }
}
