//! Multi-faction game layer.
//!
//! Everything a match needs lives in a [`World`]:
//! - Teams with resource ledgers, units, buildings and a home jewel
//! - Unit timers, respawning, and class stats
//! - Construction, repair and turret fire
//! - Jewel pickup, carrying and capture
//! - Elimination, domination and time-out scoring

mod action;
mod building;
mod capture;
mod combat;
mod construction;
mod invariants;
mod jewel;
mod observation;
mod resource;
mod team;
mod unit;
mod world;

pub use action::{ActionCommand, ActionMap, ActionTable, UnitSlot};
pub use building::{BLOCK_HALF_EXTENT, Building, BuildingId};
pub use capture::{CAPTURE_RADIUS, CaptureTracker, PICKUP_RADIUS};
pub use combat::{
    EXPLOSIVE_MULTIPLIER, EXPLOSIVE_REACH_BONUS, nearest_damaged_building, nearest_enemy_building,
    nearest_enemy_unit, strike,
};
pub use construction::{ASSIST_RADIUS, BUILD_OFFSET, REPAIR_RADIUS, build_site};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use jewel::Jewel;
pub use observation::{BuildingView, JewelView, Snapshot, TeamView, UnitView, feature_len};
pub use resource::{ResourceNode, nearest_alive};
pub use team::{ResourceLedger, Team, TeamId};
pub use unit::{Unit, UnitId};
pub use world::{GATHER_RADIUS, Loadout, StepResult, World};
