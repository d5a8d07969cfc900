//! Action commands and the versioned ordinal tables that encode them.
//!
//! The engine only ever sees [`ActionCommand`]. Integer ordinals coming from
//! learned policies or replays are decoded at the boundary through an
//! [`ActionTable`], which pins the ordinal layout of a given rule version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::BuildingKind;
use crate::game::TeamId;

/// One order for one unit for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCommand {
    /// Do nothing.
    #[default]
    Noop,
    /// Move along a direction; the vector is normalized by the engine.
    Move {
        /// Horizontal component.
        dx: f64,
        /// Vertical component (positive is down).
        dy: f64,
    },
    /// Harvest the nearest alive resource node.
    Gather,
    /// Upgrade the weapon at base (duel rules only).
    Craft,
    /// Start a building in front of the unit.
    Build(BuildingKind),
    /// Strike the nearest enemy unit in range.
    Attack,
    /// Pick up or deliver a jewel.
    Interact,
    /// Double-damage strike on the nearest enemy building.
    PlantExplosive,
    /// Patch up the nearest damaged friendly building.
    Repair,
}

impl ActionCommand {
    /// Cardinal move: up.
    pub const UP: Self = Self::Move { dx: 0.0, dy: -1.0 };
    /// Cardinal move: down.
    pub const DOWN: Self = Self::Move { dx: 0.0, dy: 1.0 };
    /// Cardinal move: left.
    pub const LEFT: Self = Self::Move { dx: -1.0, dy: 0.0 };
    /// Cardinal move: right.
    pub const RIGHT: Self = Self::Move { dx: 1.0, dy: 0.0 };

    /// Move toward a direction vector.
    #[must_use]
    pub const fn toward(dx: f64, dy: f64) -> Self {
        Self::Move { dx, dy }
    }
}

/// Addresses a unit by team and squad slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitSlot {
    /// Owning team.
    pub team: TeamId,
    /// Index within the team's squad.
    pub index: usize,
}

impl UnitSlot {
    /// Create a slot address.
    #[must_use]
    pub const fn new(team: TeamId, index: usize) -> Self {
        Self { team, index }
    }
}

/// Actions for one tick, applied in ascending `(team, index)` order.
pub type ActionMap = BTreeMap<UnitSlot, ActionCommand>;

/// Ordinal layouts, one per rule version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionTable {
    /// Two-faction layout: 0 noop, 1-4 up/down/left/right, 5 gather,
    /// 6 craft, 7 attack, 8 interact.
    JewelWarV1,
    /// Multi-faction layout: as `JewelWarV1` but 6 builds a wall, then
    /// 9 plant-explosive, 10 repair, 11 build-turret.
    WorldWarV2,
}

impl ActionTable {
    /// Number of ordinals in the table.
    #[must_use]
    pub const fn len(self) -> u32 {
        match self {
            Self::JewelWarV1 => 9,
            Self::WorldWarV2 => 12,
        }
    }

    /// Never true; every table has at least the noop ordinal.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Translate an ordinal. Unknown ordinals decode to `Noop`.
    #[must_use]
    pub const fn decode(self, ordinal: u32) -> ActionCommand {
        match (self, ordinal) {
            (_, 1) => ActionCommand::UP,
            (_, 2) => ActionCommand::DOWN,
            (_, 3) => ActionCommand::LEFT,
            (_, 4) => ActionCommand::RIGHT,
            (_, 5) => ActionCommand::Gather,
            (Self::JewelWarV1, 6) => ActionCommand::Craft,
            (Self::WorldWarV2, 6) => ActionCommand::Build(BuildingKind::Wall),
            (_, 7) => ActionCommand::Attack,
            (_, 8) => ActionCommand::Interact,
            (Self::WorldWarV2, 9) => ActionCommand::PlantExplosive,
            (Self::WorldWarV2, 10) => ActionCommand::Repair,
            (Self::WorldWarV2, 11) => ActionCommand::Build(BuildingKind::Turret),
            _ => ActionCommand::Noop,
        }
    }

    /// Reverse of [`decode`](Self::decode) for commands the table can express.
    #[must_use]
    pub fn encode(self, command: ActionCommand) -> Option<u32> {
        (0..self.len()).find(|&ordinal| self.decode(ordinal) == command)
    }
}
