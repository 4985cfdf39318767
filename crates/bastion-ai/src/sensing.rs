//! Spatial helpers shared by the behavior state machines.

use bastion_core::components::TargetRef;
use bastion_core::enums::TargetKind;
use bastion_core::types::{EntityKey, Position};

/// Something an actor can perceive: what it is and where it stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub key: EntityKey,
    pub kind: TargetKind,
    pub position: Position,
}

impl Sighting {
    pub fn new(key: EntityKey, kind: TargetKind, position: Position) -> Self {
        Self {
            key,
            kind,
            position,
        }
    }

    /// Weak reference to the sighted entity.
    pub fn target_ref(&self) -> TargetRef {
        TargetRef {
            key: self.key,
            kind: self.kind,
        }
    }
}

/// First candidate, in the given order, strictly closer than `radius`.
pub fn first_within(origin: &Position, candidates: &[Sighting], radius: f64) -> Option<Sighting> {
    candidates
        .iter()
        .find(|c| origin.range_to(&c.position) < radius)
        .copied()
}

/// All candidates strictly closer than `radius`, nearest first, paired with
/// their distance. Equal distances keep their input order.
pub fn nearest_within(
    origin: &Position,
    candidates: &[Sighting],
    radius: f64,
) -> Vec<(f64, Sighting)> {
    let mut nearby: Vec<(f64, Sighting)> = candidates
        .iter()
        .map(|c| (origin.range_to(&c.position), *c))
        .filter(|(range, _)| *range < radius)
        .collect();
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
    nearby
}
