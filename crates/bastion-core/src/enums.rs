//! Enumeration types used throughout the simulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Horizontal facing of an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// -1.0 for left, 1.0 for right.
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Direction from `from_x` toward `to_x`. Ties resolve to the left.
    pub fn toward(from_x: f64, to_x: f64) -> Self {
        if to_x > from_x {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    /// Direction from `from_x` away from `threat_x`. Ties resolve to the right.
    pub fn away_from(from_x: f64, threat_x: f64) -> Self {
        Self::toward(from_x, threat_x).flipped()
    }
}

/// Enemy behavior state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Advancing toward the current target (castle by default).
    #[default]
    Walk,
    /// Standing next to a structure and hitting it on cooldown.
    Attack,
}

/// Villager behavior state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VillagerState {
    #[default]
    Idle,
    Walk,
}

/// Villager occupation. Only `Archer` changes behavior; `Builder` and
/// `Farmer` are cosmetic for now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VillagerRole {
    #[default]
    Villager,
    Builder,
    Farmer,
    Archer,
}

/// Kind of entity a weak reference or sighting points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Structure,
    Player,
    Villager,
    Enemy,
}

/// Structure catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureKind {
    Castle,
    Wall,
    Tower,
    Farm,
    Mine,
    RecruitmentHut,
    ArcherTower,
}

impl StructureKind {
    pub const ALL: [StructureKind; 7] = [
        StructureKind::Castle,
        StructureKind::Wall,
        StructureKind::Tower,
        StructureKind::Farm,
        StructureKind::Mine,
        StructureKind::RecruitmentHut,
        StructureKind::ArcherTower,
    ];

    /// Catalog name, as used by the placement UI and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            StructureKind::Castle => "castle",
            StructureKind::Wall => "wall",
            StructureKind::Tower => "tower",
            StructureKind::Farm => "farm",
            StructureKind::Mine => "mine",
            StructureKind::RecruitmentHut => "recruitment-hut",
            StructureKind::ArcherTower => "archer-tower",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StructureKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SimError::UnknownStructureType(s.to_string()))
    }
}

/// Day/night phase of the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    #[default]
    Day,
    Night,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Lobby,
    Active,
    Paused,
    /// The castle fell. Terminal: the world no longer advances.
    Defeated,
}

/// Health bar color band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthTier {
    Green,
    Yellow,
    Red,
}

impl HealthTier {
    /// `> 0.6` green, `> 0.3` yellow, otherwise red.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.6 {
            HealthTier::Green
        } else if ratio > 0.3 {
            HealthTier::Yellow
        } else {
            HealthTier::Red
        }
    }
}
