//! Fundamental geometric and simulation types.

use serde::{Deserialize, Serialize};

/// 2D position in world space (pixels). x grows to the right, y downward.
///
/// The simulation only steers along x; y is maintained by the ground plane
/// but still participates in distance checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Velocity in world units per second. Only the horizontal component is
/// driven by actor behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Monotonic simulation time in milliseconds. Never reset by day/night.
    pub elapsed_ms: f64,
}

/// Stable key for an entity, independent of the ECS that stores it.
///
/// Keys are never reused while the entity is alive, and a key for a
/// destroyed entity simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey(pub u64);

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn range_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl SimTime {
    /// Advance by one tick of `delta_ms` milliseconds.
    pub fn advance(&mut self, delta_ms: f64) {
        self.tick += 1;
        self.elapsed_ms += delta_ms;
    }
}

/// Clamp a frame delta to a usable value: negative or non-finite becomes 0.
pub fn sanitize_delta_ms(delta_ms: f64) -> f64 {
    if delta_ms.is_finite() && delta_ms > 0.0 {
        delta_ms
    } else {
        0.0
    }
}
