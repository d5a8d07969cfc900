//! Structures owned by teams.

use crate::config::{BuildingKind, BuildingStats};
use crate::game::TeamId;
use crate::geometry::Vec2;

/// Building identity, equal to the building's index in the world's list.
pub type BuildingId = u32;

/// Half-width of the square a blocking building occupies.
pub const BLOCK_HALF_EXTENT: f64 = 0.7;

/// A placed building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    /// Unique identifier (creation order).
    pub id: BuildingId,
    /// Owning team.
    pub team: TeamId,
    /// Catalog entry.
    pub kind: BuildingKind,
    /// Position in world units.
    pub pos: Vec2,
    /// Hit points; zero means destroyed.
    pub hp: u32,
    /// Still being built.
    pub constructing: bool,
    /// Seconds of construction accumulated.
    pub progress: f64,
    /// Seconds until the next shot (turrets).
    pub cooldown: f64,
}

impl Building {
    /// A finished building at full health.
    #[must_use]
    pub fn complete(id: BuildingId, team: TeamId, kind: BuildingKind, pos: Vec2) -> Self {
        let stats = kind.stats();
        Self {
            id,
            team,
            kind,
            pos,
            hp: stats.max_hp,
            constructing: false,
            progress: stats.build_time,
            cooldown: 0.0,
        }
    }

    /// A fresh foundation at a third of full health.
    #[must_use]
    pub fn foundation(id: BuildingId, team: TeamId, kind: BuildingKind, pos: Vec2) -> Self {
        let stats = kind.stats();
        if stats.build_time <= 0.0 {
            return Self::complete(id, team, kind, pos);
        }
        Self {
            id,
            team,
            kind,
            pos,
            hp: (stats.max_hp / 3).max(1),
            constructing: true,
            progress: 0.0,
            cooldown: 0.0,
        }
    }

    /// Catalog stats.
    #[must_use]
    pub const fn stats(&self) -> &'static BuildingStats {
        self.kind.stats()
    }

    /// Whether the building still stands.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Standing but below full health.
    #[must_use]
    pub const fn is_damaged(&self) -> bool {
        self.hp > 0 && self.hp < self.kind.stats().max_hp
    }

    /// Whether this building stops a unit standing at `pos`.
    #[must_use]
    pub fn blocks(&self, pos: Vec2) -> bool {
        self.is_alive()
            && self.stats().blocks_movement
            && (self.pos.x - pos.x).abs() < BLOCK_HALF_EXTENT
            && (self.pos.y - pos.y).abs() < BLOCK_HALF_EXTENT
    }

    /// Advance construction by `dt` scaled by `assist`, and cool the weapon.
    ///
    /// Returns `true` on the tick construction finishes.
    pub fn tick(&mut self, dt: f64, assist: f64) -> bool {
        self.cooldown = (self.cooldown - dt).max(0.0);
        if !self.constructing {
            return false;
        }
        let build_time = self.stats().build_time;
        self.progress += dt * assist;
        if self.progress >= build_time {
            self.progress = build_time;
            self.constructing = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foundation_hp() {
        let wall = Building::foundation(0, 0, BuildingKind::Wall, Vec2::ZERO);
        assert_eq!(wall.hp, 40);
        assert!(wall.constructing);
        let core = Building::foundation(1, 0, BuildingKind::Core, Vec2::ZERO);
        assert_eq!(core.hp, 550);
        assert!(!core.constructing);
    }

    #[test]
    fn test_construction_completes() {
        let mut wall = Building::foundation(0, 0, BuildingKind::Wall, Vec2::ZERO);
        assert!(!wall.tick(1.0, 1.0));
        assert!(wall.tick(1.0, 1.0));
        assert!(!wall.constructing);
        assert!((wall.progress - 2.0).abs() < f64::EPSILON);
        assert!(!wall.tick(1.0, 1.0));
    }

    #[test]
    fn test_assist_speeds_up_construction() {
        let mut turret = Building::foundation(0, 0, BuildingKind::Turret, Vec2::ZERO);
        assert!(turret.tick(2.0, 2.0));
    }

    #[test]
    fn test_blocking_box() {
        let wall = Building::complete(0, 0, BuildingKind::Wall, Vec2::new(5.0, 5.0));
        assert!(wall.blocks(Vec2::new(5.5, 4.5)));
        assert!(!wall.blocks(Vec2::new(5.7, 5.0)));
        let mut ruin = wall;
        ruin.hp = 0;
        assert!(!ruin.blocks(Vec2::new(5.0, 5.0)));
    }
}
