//! Factions and their resource ledgers.

use serde::{Deserialize, Serialize};

use crate::config::{ResourceKind, TeamProfile};
use crate::game::{BuildingId, UnitId};

/// Team identity (0-based).
pub type TeamId = u8;

/// Per-kind resource counts. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    counts: [u32; 3],
}

impl ResourceLedger {
    /// Ledger with the given wood, metal and fuel.
    #[must_use]
    pub const fn new(wood: u32, metal: u32, fuel: u32) -> Self {
        Self {
            counts: [wood, metal, fuel],
        }
    }

    /// Every team starts with this.
    #[must_use]
    pub const fn starting() -> Self {
        Self::new(6, 4, 2)
    }

    /// Amount held of `kind`.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Credit `amount` of `kind`.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        self.counts[kind.index()] = self.counts[kind.index()].saturating_add(amount);
    }

    /// Whether every line of `cost` is covered.
    #[must_use]
    pub fn can_afford(&self, cost: &[(ResourceKind, u32)]) -> bool {
        cost.iter().all(|&(kind, amount)| self.get(kind) >= amount)
    }

    /// Deduct `cost` in full, or leave the ledger untouched and return `false`.
    pub fn try_spend(&mut self, cost: &[(ResourceKind, u32)]) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for &(kind, amount) in cost {
            self.counts[kind.index()] -= amount;
        }
        true
    }

    /// Total of all kinds.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Weighted worth used by the time-out tiebreak.
    #[must_use]
    pub fn weighted_value(&self) -> f64 {
        f64::from(self.get(ResourceKind::Wood))
            + 1.4 * f64::from(self.get(ResourceKind::Metal))
            + 1.6 * f64::from(self.get(ResourceKind::Fuel))
    }
}

/// A faction.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    /// Identity.
    pub id: TeamId,
    /// Display name and colour.
    pub profile: TeamProfile,
    /// Stockpile.
    pub ledger: ResourceLedger,
    /// Units in squad-slot order.
    pub units: Vec<UnitId>,
    /// Buildings owned, in creation order.
    pub buildings: Vec<BuildingId>,
    /// Set once the core falls. Never cleared.
    pub eliminated: bool,
}

impl Team {
    /// A fresh team with the starting ledger.
    #[must_use]
    pub fn new(id: TeamId, profile: TeamProfile) -> Self {
        Self {
            id,
            profile,
            ledger: ResourceLedger::starting(),
            units: Vec::new(),
            buildings: Vec::new(),
            eliminated: false,
        }
    }

    /// Unit id for squad slot `index`.
    #[must_use]
    pub fn unit_at(&self, index: usize) -> Option<UnitId> {
        self.units.get(index).copied()
    }

    /// Mark as eliminated. Returns `true` the first time only.
    pub fn eliminate(&mut self) -> bool {
        let first = !self.eliminated;
        self.eliminated = true;
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildingKind, TEAM_PROFILES};

    #[test]
    fn test_spend_is_all_or_nothing() {
        let mut ledger = ResourceLedger::new(10, 0, 5);
        let cost = BuildingKind::Turret.stats().cost;
        assert!(!ledger.try_spend(cost));
        assert_eq!(ledger, ResourceLedger::new(10, 0, 5));

        ledger.add(ResourceKind::Metal, 7);
        assert!(ledger.try_spend(cost));
        assert_eq!(ledger, ResourceLedger::new(10, 0, 2));
    }

    #[test]
    fn test_weighted_value() {
        let ledger = ResourceLedger::new(1, 1, 1);
        assert!((ledger.weighted_value() - 4.0).abs() < 1e-12);
        assert_eq!(ledger.total(), 3);
    }

    #[test]
    fn test_elimination_is_one_way() {
        let mut team = Team::new(0, TEAM_PROFILES[0]);
        assert!(team.eliminate());
        assert!(!team.eliminate());
        assert!(team.eliminated);
    }

    #[test]
    fn test_starting_ledger() {
        let team = Team::new(2, TEAM_PROFILES[2]);
        assert_eq!(team.ledger.get(ResourceKind::Wood), 6);
        assert_eq!(team.ledger.get(ResourceKind::Metal), 4);
        assert_eq!(team.ledger.get(ResourceKind::Fuel), 2);
        assert_eq!(team.profile.name, "Green");
    }
}
