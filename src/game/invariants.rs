//! World invariants - sanity checks that detect bugs.
//!
//! The tick function should never produce a state that fails these. They are
//! run by the test suite and by debug builds of the match runners.

use crate::config::BuildingKind;
use crate::game::World;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut fail = |message: String| violations.push(InvariantViolation { message });

    if !world.time.is_finite() || world.time < 0.0 {
        fail(format!("Clock reads {}", world.time));
    }
    if world.done && world.winner.is_none() {
        fail("Match is done without a winner".to_string());
    }
    if world.winner.is_some() && !world.done {
        fail(format!("Winner {:?} recorded before the match ended", world.winner));
    }

    // Ids double as indices
    for (i, unit) in world.units.iter().enumerate() {
        if unit.id as usize != i {
            fail(format!("Unit at index {i} has id {}", unit.id));
        }
    }
    for (i, building) in world.buildings.iter().enumerate() {
        if building.id as usize != i {
            fail(format!("Building at index {i} has id {}", building.id));
        }
    }

    for unit in &world.units {
        let max_hp = unit.stats().max_hp;
        if unit.hp > max_hp {
            fail(format!("Unit {} has hp {} > max {max_hp}", unit.id, unit.hp));
        }
        if unit.busy < 0.0 || unit.cooldown < 0.0 || unit.respawn_timer < 0.0 {
            fail(format!("Unit {} has a negative timer", unit.id));
        }
        if !unit.is_alive() && unit.has_jewel {
            fail(format!("Dead unit {} still holds a jewel", unit.id));
        }
        if unit.is_alive() && world.is_blocked(unit.pos) {
            fail(format!("Unit {} stands on blocked ground at {:?}", unit.id, unit.pos));
        }
        let carried = world
            .jewels
            .iter()
            .filter(|j| j.carried_by == Some(unit.id))
            .count();
        if carried > 1 {
            fail(format!("Unit {} carries {carried} jewels", unit.id));
        }
        if unit.has_jewel != (carried == 1) {
            fail(format!(
                "Unit {} jewel flag {} disagrees with {carried} carried jewels",
                unit.id, unit.has_jewel
            ));
        }
    }

    for building in &world.buildings {
        let max_hp = building.stats().max_hp;
        if building.hp > max_hp {
            fail(format!("Building {} has hp {} > max {max_hp}", building.id, building.hp));
        }
        let build_time = building.stats().build_time;
        if building.progress > build_time + 1e-9 {
            fail(format!("Building {} progress overshoots", building.id));
        }
        if building.constructing && building.progress >= build_time {
            fail(format!("Building {} finished but still constructing", building.id));
        }
    }

    for jewel in &world.jewels {
        if let Some(carrier) = jewel.carried_by {
            match world.units.get(carrier as usize) {
                Some(unit) if unit.team == jewel.home_team => {
                    fail(format!("Team {} carries its own jewel", unit.team));
                }
                Some(unit) if unit.pos != jewel.pos => {
                    fail(format!("Jewel {} lags its carrier {carrier}", jewel.home_team));
                }
                Some(_) => {}
                None => fail(format!("Jewel {} carried by missing unit {carrier}", jewel.home_team)),
            }
            if jewel.at_home {
                fail(format!("Jewel {} is both carried and at home", jewel.home_team));
            }
        }
        if jewel.at_home && world.base(jewel.home_team) != Some(jewel.pos) {
            fail(format!("Jewel {} is at home away from its base", jewel.home_team));
        }
    }

    if world.jewels.len() != world.teams.len() {
        fail(format!(
            "{} jewels for {} teams",
            world.jewels.len(),
            world.teams.len()
        ));
    }
    for (i, jewel) in world.jewels.iter().enumerate() {
        if usize::from(jewel.home_team) != i {
            fail(format!("Jewel at index {i} belongs to team {}", jewel.home_team));
        }
    }

    for team in &world.teams {
        let core_alive = world
            .buildings
            .iter()
            .any(|b| b.team == team.id && b.kind == BuildingKind::Core && b.is_alive());
        if team.eliminated && core_alive {
            fail(format!("Eliminated team {} still has a core", team.id));
        }
        if world.capture.held(team.id) < 0.0 {
            fail(format!("Team {} has a negative capture hold", team.id));
        }
    }

    violations
}

/// Assert all world invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(world: &World) {
    let violations = check_invariants(world);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("World invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_world: &World) {}
