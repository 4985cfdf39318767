//! Coin ledger: the settlement's purse and the coins lying on the ground.
//!
//! Only the ledger mutates the balance and the pickup set. Pickups are keyed
//! by a monotonically increasing id so that a collected id never comes back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bastion_core::state::PickupView;
use bastion_core::types::Position;

/// Identifier of a coin pickup. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickupId(pub u32);

/// A coin lying in the world, waiting for the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinPickup {
    pub id: PickupId,
    pub position: Position,
    pub value: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balance: u32,
    pickups: BTreeMap<PickupId, CoinPickup>,
    next_id: u32,
}

impl Ledger {
    pub fn new(starting_balance: u32) -> Self {
        Self {
            balance: starting_balance,
            ..Default::default()
        }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    /// Credit `amount` coins and return the new balance.
    pub fn add_coins(&mut self, amount: u32) -> u32 {
        self.balance = self.balance.saturating_add(amount);
        self.balance
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.balance >= amount
    }

    /// Debit `amount` coins and return the new balance.
    ///
    /// Callers check `can_afford` first. An overspend floors the balance at
    /// zero rather than wrapping.
    pub fn spend(&mut self, amount: u32) -> u32 {
        if amount > self.balance {
            tracing::warn!(
                amount,
                balance = self.balance,
                "spend exceeds balance, flooring at zero"
            );
        }
        self.balance = self.balance.saturating_sub(amount);
        self.balance
    }

    /// Drop a coin at `(x, y)` worth `value`.
    pub fn create_pickup(&mut self, x: f64, y: f64, value: u32) -> PickupId {
        let id = PickupId(self.next_id);
        self.next_id += 1;
        self.pickups.insert(
            id,
            CoinPickup {
                id,
                position: Position::new(x, y),
                value,
            },
        );
        id
    }

    /// Live pickups within `radius` of `(x, y)`, inclusive.
    pub fn query_within_radius(&self, x: f64, y: f64, radius: f64) -> Vec<CoinPickup> {
        let origin = Position::new(x, y);
        self.pickups
            .values()
            .filter(|p| origin.range_to(&p.position) <= radius)
            .copied()
            .collect()
    }

    /// Remove a pickup. Returns it the first time; `None` once it is gone.
    /// Does not credit the balance.
    pub fn collect(&mut self, id: PickupId) -> Option<CoinPickup> {
        self.pickups.remove(&id)
    }

    /// Collect every pickup within `radius` and credit their total.
    /// Returns the amount credited, 0 if nothing was in reach.
    pub fn collect_within_radius(&mut self, x: f64, y: f64, radius: f64) -> u32 {
        let in_reach = self.query_within_radius(x, y, radius);
        if in_reach.is_empty() {
            return 0;
        }
        let total: u32 = in_reach.iter().map(|p| p.value).sum();
        self.add_coins(total);
        for pickup in &in_reach {
            self.collect(pickup.id);
        }
        total
    }

    pub fn pickups(&self) -> impl Iterator<Item = &CoinPickup> {
        self.pickups.values()
    }

    pub fn pickup_count(&self) -> usize {
        self.pickups.len()
    }

    pub fn views(&self) -> Vec<PickupView> {
        self.pickups
            .values()
            .map(|p| PickupView {
                id: p.id.0,
                position: p.position,
                value: p.value,
            })
            .collect()
    }
}
