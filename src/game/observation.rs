//! Read-only views of a world.
//!
//! [`Snapshot`] is plain serializable data meant for renderers and replay
//! files. [`feature_vector`] flattens one team's perspective into a
//! fixed-length numeric vector for policies.

// Feature vectors are f32 by convention
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};

use crate::config::{BuildingKind, ResourceKind, UnitClass};
use crate::game::{BuildingId, ResourceLedger, TeamId, UnitId, World};
use crate::geometry::Vec2;

/// Values per squad slot: x, y, hp fraction, jewel flag, nearest-resource distance.
pub(crate) const FEATURES_PER_UNIT: usize = 5;

/// Number of enemy units summarized at the end of the vector.
pub(crate) const ENEMY_SLOTS: usize = 3;

/// Values per enemy slot: x, y, hp fraction.
pub(crate) const FEATURES_PER_ENEMY: usize = 3;

/// Length of a feature vector for the given squad size.
#[must_use]
pub const fn feature_len(squad_size: usize) -> usize {
    squad_size * FEATURES_PER_UNIT + ResourceKind::ALL.len() + ENEMY_SLOTS * FEATURES_PER_ENEMY
}

/// One unit as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    /// Unit id.
    pub id: UnitId,
    /// Class.
    pub class: UnitClass,
    /// Position.
    pub pos: Vec2,
    /// Hit points.
    pub hp: u32,
    /// Carrying a jewel.
    pub has_jewel: bool,
}

/// One standing building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingView {
    /// Building id.
    pub id: BuildingId,
    /// Kind.
    pub kind: BuildingKind,
    /// Position.
    pub pos: Vec2,
    /// Hit points.
    pub hp: u32,
    /// Still under construction.
    pub constructing: bool,
}

/// One team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamView {
    /// Team id.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Eliminated flag.
    pub eliminated: bool,
    /// Stockpile.
    pub resources: ResourceLedger,
    /// Units in slot order.
    pub units: Vec<UnitView>,
    /// Standing buildings.
    pub buildings: Vec<BuildingView>,
}

/// One jewel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JewelView {
    /// Owning team.
    pub team: TeamId,
    /// Position.
    pub pos: Vec2,
    /// Carrier, if any.
    pub carried_by: Option<UnitId>,
    /// Untouched at home.
    pub at_home: bool,
}

/// The whole world at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation clock.
    pub time: f64,
    /// Match over.
    pub done: bool,
    /// Winner once decided.
    pub winner: Option<TeamId>,
    /// Per-team state.
    pub teams: Vec<TeamView>,
    /// Jewels, one per team.
    pub jewels: Vec<JewelView>,
}

/// Capture the world as plain data.
#[must_use]
pub(crate) fn snapshot(world: &World) -> Snapshot {
    let teams = world
        .teams
        .iter()
        .map(|team| TeamView {
            id: team.id,
            name: team.profile.name.to_string(),
            eliminated: team.eliminated,
            resources: team.ledger,
            units: world
                .team_units(team.id)
                .into_iter()
                .map(|u| UnitView {
                    id: u.id,
                    class: u.class,
                    pos: u.pos,
                    hp: u.hp,
                    has_jewel: u.has_jewel,
                })
                .collect(),
            buildings: world
                .buildings
                .iter()
                .filter(|b| b.team == team.id && b.is_alive())
                .map(|b| BuildingView {
                    id: b.id,
                    kind: b.kind,
                    pos: b.pos,
                    hp: b.hp,
                    constructing: b.constructing,
                })
                .collect(),
        })
        .collect();

    let jewels = world
        .jewels
        .iter()
        .map(|j| JewelView {
            team: j.home_team,
            pos: j.pos,
            carried_by: j.carried_by,
            at_home: j.at_home,
        })
        .collect();

    Snapshot {
        time: world.time,
        done: world.done,
        winner: world.winner,
        teams,
        jewels,
    }
}

/// Flatten `team`'s view of the world into [`feature_len`] values in `[0, 1]`.
///
/// Layout: per squad slot `(x, y, hp, jewel, resource distance)`, then the
/// team's wood/50, metal/50, fuel/30, then the first three living enemy units
/// by id as `(x, y, hp)`. Missing enemies are zero-padded.
#[must_use]
pub(crate) fn feature_vector(world: &World, team: TeamId) -> Vec<f32> {
    let width = f64::from(world.layout.width);
    let height = f64::from(world.layout.height);
    let span = width.max(height);
    let squad = world.tuning.squad_size;
    let mut out = Vec::with_capacity(feature_len(squad));

    let units = world.team_units(team);
    for slot in 0..squad {
        let Some(u) = units.get(slot).or_else(|| units.last()) else {
            out.extend([0.0; FEATURES_PER_UNIT]);
            continue;
        };
        let resource_dist = world
            .nearest_resource(u.pos)
            .map_or(1.0, |(_, d)| (d / span).min(1.0));
        out.extend([
            (u.pos.x / width) as f32,
            (u.pos.y / height) as f32,
            u.hp_fraction() as f32,
            if u.has_jewel { 1.0 } else { 0.0 },
            resource_dist as f32,
        ]);
    }

    let ledger = world
        .teams
        .get(usize::from(team))
        .map(|t| t.ledger)
        .unwrap_or_default();
    out.extend([
        (f64::from(ledger.get(ResourceKind::Wood)) / 50.0).min(1.0) as f32,
        (f64::from(ledger.get(ResourceKind::Metal)) / 50.0).min(1.0) as f32,
        (f64::from(ledger.get(ResourceKind::Fuel)) / 30.0).min(1.0) as f32,
    ]);

    let mut enemies = world
        .units
        .iter()
        .filter(|u| u.team != team && u.is_alive())
        .take(ENEMY_SLOTS);
    for _ in 0..ENEMY_SLOTS {
        match enemies.next() {
            Some(e) => out.extend([
                (e.pos.x / width) as f32,
                (e.pos.y / height) as f32,
                e.hp_fraction() as f32,
            ]),
            None => out.extend([0.0; FEATURES_PER_ENEMY]),
        }
    }

    out
}
