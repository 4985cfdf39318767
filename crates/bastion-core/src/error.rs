//! Error types for the BASTION simulation.
//!
//! None of these are fatal: the simulation keeps ticking after any of them
//! is returned to a caller.

use crate::enums::StructureKind;

/// Errors raised by simulation operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// The requested structure type is not in the catalog.
    #[error("unknown structure type: {0}")]
    UnknownStructureType(String),
}

/// Reasons the placement handler refuses to build.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementError {
    /// The structure has no build cost (castle, archer tower).
    #[error("{0} cannot be built by the player")]
    NotBuildable(StructureKind),

    /// Not enough coins in the ledger.
    #[error("{kind} costs {cost} coins, only {balance} available")]
    InsufficientCoins {
        /// Structure being placed.
        kind: StructureKind,
        /// Build cost.
        cost: u32,
        /// Current balance.
        balance: u32,
    },

    /// Another structure stands closer than the minimum spacing.
    #[error("too close to an existing structure at x={existing_x:.0} (min spacing {min_spacing:.0})")]
    TooClose {
        /// Position of the blocking structure.
        existing_x: f64,
        /// Required spacing.
        min_spacing: f64,
    },

    /// The registry refused the structure.
    #[error(transparent)]
    Registry(#[from] SimError),
}

/// Errors loading a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for the schema.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but holds values the simulation cannot run with.
    #[error("invalid config value: {0}")]
    Invalid(String),
}
