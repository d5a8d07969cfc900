//! Capture-hold bookkeeping.

use crate::game::TeamId;

/// Distance from the home base within which a carrier can capture.
pub const CAPTURE_RADIUS: f64 = 1.6;

/// Distance within which an uncarried enemy jewel can be picked up.
pub const PICKUP_RADIUS: f64 = 1.2;

/// Per-team accumulated hold time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptureTracker {
    held: Vec<f64>,
}

impl CaptureTracker {
    /// A tracker for `teams` teams, all at zero.
    #[must_use]
    pub fn new(teams: usize) -> Self {
        Self {
            held: vec![0.0; teams],
        }
    }

    /// Seconds held so far by `team`.
    #[must_use]
    pub fn held(&self, team: TeamId) -> f64 {
        self.held.get(usize::from(team)).copied().unwrap_or(0.0)
    }

    /// Add `dt` to the team's hold. Returns `true` once `required` is reached.
    pub fn advance(&mut self, team: TeamId, dt: f64, required: f64) -> bool {
        let Some(held) = self.held.get_mut(usize::from(team)) else {
            return false;
        };
        *held += dt;
        *held >= required
    }

    /// Drop the team's hold back to zero.
    pub fn reset(&mut self, team: TeamId) {
        if let Some(held) = self.held.get_mut(usize::from(team)) {
            *held = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_reset() {
        let mut tracker = CaptureTracker::new(2);
        assert!(!tracker.advance(0, 1.0, 2.5));
        assert!(!tracker.advance(0, 1.0, 2.5));
        tracker.reset(0);
        assert!(tracker.held(0).abs() < f64::EPSILON);
        assert!(!tracker.advance(0, 1.0, 2.5));
        assert!(!tracker.advance(0, 1.0, 2.5));
        assert!(tracker.advance(0, 1.0, 2.5));
    }

    #[test]
    fn test_zero_requirement_captures_immediately() {
        let mut tracker = CaptureTracker::new(2);
        assert!(tracker.advance(1, 1.0 / 30.0, 0.0));
    }

    #[test]
    fn test_unknown_team_is_ignored() {
        let mut tracker = CaptureTracker::new(2);
        assert!(!tracker.advance(5, 10.0, 0.0));
        tracker.reset(5);
        assert!(tracker.held(5).abs() < f64::EPSILON);
    }
}
