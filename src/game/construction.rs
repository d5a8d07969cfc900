//! Building placement and construction assistance.

use crate::game::building::BLOCK_HALF_EXTENT;
use crate::game::{Building, Unit};
use crate::geometry::Vec2;

/// Horizontal offset from the builder to the new foundation, before rounding.
pub const BUILD_OFFSET: f64 = 1.2;

/// Engineers within this distance speed up friendly construction.
pub const ASSIST_RADIUS: f64 = 2.2;

/// Reach of the repair action.
pub const REPAIR_RADIUS: f64 = 1.3;

/// Hit points restored per repair.
pub(crate) const REPAIR_AMOUNT: u32 = 12;

/// Busy lock after a repair.
pub(crate) const REPAIR_LOCK_S: f64 = 0.3;

/// Lower bound on the build-speed divisor.
pub(crate) const MIN_BUILD_SPEED: f64 = 0.2;

/// Where a unit at `pos` places its next building.
///
/// The site is snapped to integer coordinates ahead of the unit on the x axis.
/// The offset keeps the builder outside the new building's blocking square.
#[must_use]
pub fn build_site(pos: Vec2) -> Vec2 {
    Vec2::new((pos.x + BUILD_OFFSET).round(), pos.y.round())
}

/// Whether any living unit stands inside the blocking square centred on `site`.
#[must_use]
pub(crate) fn site_occupied(units: &[Unit], site: Vec2) -> bool {
    units.iter().any(|u| {
        u.is_alive()
            && (u.pos.x - site.x).abs() < BLOCK_HALF_EXTENT
            && (u.pos.y - site.y).abs() < BLOCK_HALF_EXTENT
    })
}

/// Construction speed factor for `building`: the best build speed among the
/// owner's living builders in range, never below 1.
#[must_use]
pub(crate) fn assist_factor(building: &Building, units: &[Unit]) -> f64 {
    units
        .iter()
        .filter(|u| {
            u.team == building.team
                && u.is_alive()
                && u.class.can_build()
                && u.pos.within(building.pos, ASSIST_RADIUS)
        })
        .map(|u| u.stats().build_speed)
        .fold(1.0, f64::max)
}

/// Busy lock for a builder starting a building that takes `build_time`.
#[must_use]
pub(crate) fn build_lock(unit: &Unit, build_time: f64) -> f64 {
    build_time / unit.stats().build_speed.max(MIN_BUILD_SPEED)
}
