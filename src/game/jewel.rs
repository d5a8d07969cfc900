//! Team jewels.

use crate::game::{TeamId, UnitId};
use crate::geometry::Vec2;

/// The objective each team defends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jewel {
    /// Team that owns the jewel. Never changes.
    pub home_team: TeamId,
    /// Current position.
    pub pos: Vec2,
    /// Unit currently carrying it.
    pub carried_by: Option<UnitId>,
    /// Untouched at the owner's base.
    pub at_home: bool,
}

impl Jewel {
    /// A jewel resting at its home base.
    #[must_use]
    pub const fn new(home_team: TeamId, pos: Vec2) -> Self {
        Self {
            home_team,
            pos,
            carried_by: None,
            at_home: true,
        }
    }

    /// Whether some unit holds it.
    #[must_use]
    pub const fn is_carried(&self) -> bool {
        self.carried_by.is_some()
    }

    /// Attach to a carrier.
    pub fn pick_up(&mut self, carrier: UnitId) {
        self.carried_by = Some(carrier);
        self.at_home = false;
    }

    /// Release at `pos`.
    pub fn drop_at(&mut self, pos: Vec2) {
        self.carried_by = None;
        self.at_home = false;
        self.pos = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_up_and_drop() {
        let mut jewel = Jewel::new(1, Vec2::new(2.0, 9.0));
        assert!(jewel.at_home);
        jewel.pick_up(4);
        assert_eq!(jewel.carried_by, Some(4));
        assert!(!jewel.at_home);
        jewel.drop_at(Vec2::new(10.0, 10.0));
        assert!(!jewel.is_carried());
        assert!(!jewel.at_home);
        assert_eq!(jewel.pos, Vec2::new(10.0, 10.0));
    }
}
