//! Data-driven game configuration.
//!
//! `GameConfig` holds the tunables a session starts from: world size, day
//! length, starting purse, RNG seed, the structure catalog and the build
//! cost table. Defaults come from `constants.rs`; any field may be
//! overridden from a JSON file. Two sessions with the same config and seed
//! play out identically.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::StructureKind;
use crate::error::ConfigError;

/// Static per-type structure parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureSpec {
    pub health: i32,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    pub world_size: f64,
    pub day_duration_ms: f64,
    pub starting_coins: u32,
    /// Structures the registry knows how to build. A kind missing here
    /// cannot be created.
    pub catalog: BTreeMap<StructureKind, StructureSpec>,
    /// Coins the player pays to place a structure. Kinds without an entry
    /// cannot be placed by the player.
    pub build_costs: BTreeMap<StructureKind, u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            world_size: WORLD_SIZE,
            day_duration_ms: DAY_DURATION_MS,
            starting_coins: STARTING_COINS,
            catalog: default_catalog(),
            build_costs: default_build_costs(),
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.day_duration_ms.is_finite() && self.day_duration_ms > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "day_duration_ms must be positive, got {}",
                self.day_duration_ms
            )));
        }
        if !(self.world_size.is_finite() && self.world_size > 2.0 * WAVE_EDGE_MARGIN) {
            return Err(ConfigError::Invalid(format!(
                "world_size must exceed {}, got {}",
                2.0 * WAVE_EDGE_MARGIN,
                self.world_size
            )));
        }
        if !(self.time_scale.is_finite() && (0.0..=MAX_TIME_SCALE).contains(&self.time_scale)) {
            return Err(ConfigError::Invalid(format!(
                "time_scale must be within 0..={MAX_TIME_SCALE}, got {}",
                self.time_scale
            )));
        }
        if !self.catalog.contains_key(&StructureKind::Castle) {
            return Err(ConfigError::Invalid("catalog has no castle".into()));
        }
        if let Some((kind, spec)) = self.catalog.iter().find(|(_, spec)| spec.health <= 0) {
            return Err(ConfigError::Invalid(format!(
                "{kind} must start with positive health, got {}",
                spec.health
            )));
        }
        Ok(())
    }

    /// Night length derived from the day length.
    pub fn night_duration_ms(&self) -> f64 {
        self.day_duration_ms * NIGHT_FRACTION
    }
}

/// The stock structure catalog.
pub fn default_catalog() -> BTreeMap<StructureKind, StructureSpec> {
    let spec = |health, width, height| StructureSpec {
        health,
        width,
        height,
    };
    BTreeMap::from([
        (StructureKind::Castle, spec(20, 200.0, 200.0)),
        (StructureKind::Wall, spec(10, 60.0, 120.0)),
        (StructureKind::Tower, spec(8, 80.0, 150.0)),
        (StructureKind::Farm, spec(5, 120.0, 80.0)),
        (StructureKind::Mine, spec(6, 100.0, 100.0)),
        (StructureKind::RecruitmentHut, spec(5, 80.0, 80.0)),
        (StructureKind::ArcherTower, spec(7, 80.0, 180.0)),
    ])
}

/// Build menu prices. Castle and archer tower are not for sale.
pub fn default_build_costs() -> BTreeMap<StructureKind, u32> {
    BTreeMap::from([
        (StructureKind::Wall, 5),
        (StructureKind::Tower, 15),
        (StructureKind::Farm, 10),
        (StructureKind::Mine, 20),
        (StructureKind::RecruitmentHut, 8),
    ])
}
