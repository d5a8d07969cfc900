//! Target selection and damage.
//!
//! Every "nearest" query here breaks distance ties by the lower entity id.
//! Units and buildings are stored in id order, so scanning with a strict
//! `<` keeps the first candidate found at the minimal distance.

use crate::config::BuildingKind;
use crate::game::{Building, TeamId, Unit};
use crate::geometry::Vec2;

/// Extra reach granted to explosive charges over the unit's weapon range.
pub const EXPLOSIVE_REACH_BONUS: f64 = 0.2;

/// Damage multiplier for explosive charges.
pub const EXPLOSIVE_MULTIPLIER: u32 = 2;

/// Index of the nearest living unit not on `team` within `range` of `from`.
#[must_use]
pub fn nearest_enemy_unit(units: &[Unit], team: TeamId, from: Vec2, range: f64) -> Option<usize> {
    nearest(
        units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.team != team && u.is_alive())
            .map(|(i, u)| (i, u.pos)),
        from,
        range,
    )
}

/// Index of the nearest standing building not owned by `team` within `range`.
#[must_use]
pub fn nearest_enemy_building(
    buildings: &[Building],
    team: TeamId,
    from: Vec2,
    range: f64,
) -> Option<usize> {
    nearest(
        buildings
            .iter()
            .enumerate()
            .filter(|(_, b)| b.team != team && b.is_alive())
            .map(|(i, b)| (i, b.pos)),
        from,
        range,
    )
}

/// Index of the nearest damaged building owned by `team` within `range`.
#[must_use]
pub fn nearest_damaged_building(
    buildings: &[Building],
    team: TeamId,
    from: Vec2,
    range: f64,
) -> Option<usize> {
    nearest(
        buildings
            .iter()
            .enumerate()
            .filter(|(_, b)| b.team == team && b.is_damaged())
            .map(|(i, b)| (i, b.pos)),
        from,
        range,
    )
}

fn nearest(candidates: impl Iterator<Item = (usize, Vec2)>, from: Vec2, range: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, pos) in candidates {
        if !from.within(pos, range) {
            continue;
        }
        let d = from.distance(pos);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Subtract `damage` from `hp`, flooring at zero.
///
/// Returns `true` only when this hit takes a living target to zero.
pub fn strike(hp: &mut u32, damage: u32) -> bool {
    let was_alive = *hp > 0;
    *hp = hp.saturating_sub(damage);
    was_alive && *hp == 0
}

/// Whether a turret is in a state to shoot this tick.
#[must_use]
pub(crate) fn turret_ready(turret: &Building) -> bool {
    turret.kind == BuildingKind::Turret
        && turret.is_alive()
        && !turret.constructing
        && turret.cooldown <= 0.0
        && turret.stats().attack.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitClass;

    fn unit(id: u32, team: TeamId, x: f64, y: f64) -> Unit {
        Unit::new(id, team, UnitClass::Assault, Vec2::new(x, y))
    }

    #[test]
    fn test_strike_floors_at_zero() {
        let mut hp = 15;
        assert!(!strike(&mut hp, 10));
        assert_eq!(hp, 5);
        assert!(strike(&mut hp, 10));
        assert_eq!(hp, 0);
        // Already dead: no second kill
        assert!(!strike(&mut hp, 10));
        assert_eq!(hp, 0);
    }

    #[test]
    fn test_nearest_enemy_ignores_allies_and_dead() {
        let mut units = vec![
            unit(0, 0, 0.0, 0.0),
            unit(1, 0, 0.5, 0.0),
            unit(2, 1, 1.0, 0.0),
            unit(3, 1, 1.5, 0.0),
        ];
        assert_eq!(nearest_enemy_unit(&units, 0, Vec2::ZERO, 2.0), Some(2));
        units[2].hp = 0;
        assert_eq!(nearest_enemy_unit(&units, 0, Vec2::ZERO, 2.0), Some(3));
        assert_eq!(nearest_enemy_unit(&units, 0, Vec2::ZERO, 1.0), None);
    }

    #[test]
    fn test_equidistant_targets_pick_lowest_id() {
        let units = vec![
            unit(0, 0, 5.0, 5.0),
            unit(1, 1, 6.0, 5.0),
            unit(2, 2, 4.0, 5.0),
            unit(3, 1, 5.0, 6.0),
        ];
        assert_eq!(nearest_enemy_unit(&units, 0, Vec2::new(5.0, 5.0), 1.5), Some(1));
    }

    #[test]
    fn test_range_boundary_is_inclusive() {
        let units = vec![unit(0, 0, 0.0, 0.0), unit(1, 1, 1.7, 0.0)];
        assert_eq!(nearest_enemy_unit(&units, 0, Vec2::ZERO, 1.7), Some(1));
    }

    #[test]
    fn test_building_queries() {
        let mut buildings = vec![
            Building::complete(0, 0, BuildingKind::Core, Vec2::new(0.0, 0.0)),
            Building::complete(1, 1, BuildingKind::Core, Vec2::new(1.0, 0.0)),
            Building::complete(2, 0, BuildingKind::Wall, Vec2::new(0.0, 1.0)),
        ];
        assert_eq!(nearest_enemy_building(&buildings, 0, Vec2::ZERO, 1.5), Some(1));
        assert_eq!(nearest_damaged_building(&buildings, 0, Vec2::ZERO, 1.5), None);
        buildings[2].hp -= 10;
        assert_eq!(nearest_damaged_building(&buildings, 0, Vec2::ZERO, 1.5), Some(2));
    }

    #[test]
    fn test_turret_ready() {
        let mut turret = Building::foundation(0, 0, BuildingKind::Turret, Vec2::ZERO);
        assert!(!turret_ready(&turret));
        turret.constructing = false;
        assert!(turret_ready(&turret));
        turret.cooldown = 0.5;
        assert!(!turret_ready(&turret));
        let wall = Building::complete(1, 0, BuildingKind::Wall, Vec2::ZERO);
        assert!(!turret_ready(&wall));
    }
}
