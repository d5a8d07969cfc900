//! Squad members.

use crate::config::{ClassStats, UnitClass};
use crate::game::TeamId;
use crate::geometry::Vec2;

/// Unit identity, equal to the unit's index in the world's unit list.
pub type UnitId = u32;

/// A controllable unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    /// Unique identifier (creation order).
    pub id: UnitId,
    /// Owning team.
    pub team: TeamId,
    /// Stat class.
    pub class: UnitClass,
    /// Position in world units.
    pub pos: Vec2,
    /// Hit points; zero means dead.
    pub hp: u32,
    /// Seconds until the next attack is allowed.
    pub cooldown: f64,
    /// Seconds until the unit accepts new actions.
    pub busy: f64,
    /// Whether the unit is carrying an enemy jewel.
    pub has_jewel: bool,
    /// Seconds until a dead unit may revive.
    pub respawn_timer: f64,
}

impl Unit {
    /// Create a unit at full health.
    #[must_use]
    pub fn new(id: UnitId, team: TeamId, class: UnitClass, pos: Vec2) -> Self {
        Self {
            id,
            team,
            class,
            pos,
            hp: class.stats().max_hp,
            cooldown: 0.0,
            busy: 0.0,
            has_jewel: false,
            respawn_timer: 0.0,
        }
    }

    /// Class stat bundle.
    #[must_use]
    pub const fn stats(&self) -> &'static ClassStats {
        self.class.stats()
    }

    /// Whether the unit has hit points left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Alive and not locked by a running action.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.is_alive() && self.busy <= 0.0
    }

    /// Health as a fraction of the class maximum.
    #[must_use]
    pub fn hp_fraction(&self) -> f64 {
        f64::from(self.hp) / f64::from(self.stats().max_hp)
    }

    /// Count down the attack and action timers.
    pub fn tick_timers(&mut self, dt: f64) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.busy = (self.busy - dt).max(0.0);
    }

    /// Restore to full health at `pos` with all timers cleared.
    pub fn revive(&mut self, pos: Vec2) {
        self.pos = pos;
        self.hp = self.stats().max_hp;
        self.cooldown = 0.0;
        self.busy = 0.0;
        self.has_jewel = false;
        self.respawn_timer = 0.0;
    }
}
