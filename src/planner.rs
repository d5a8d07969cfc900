//! Scripted controllers.
//!
//! Planners read game state and return commands; they never mutate the game.
//! [`SquadPlanner`] drives a multi-faction team, [`ScriptBot`] drives one
//! duel agent. Both route around obstacles through [`Navigator`].

mod script_bot;
mod squad;

pub use script_bot::ScriptBot;
pub use squad::{Behavior, MAX_PLANNED_WALLS, SquadPlanner};

use std::collections::HashSet;

use crate::duel::Duel;
use crate::game::{ActionCommand, World};
use crate::geometry::{Cell, Vec2, grid_extent};
use crate::pathfinding::a_star;

/// How far ahead the straight-line route is probed for obstacles.
const PROBE_DISTANCE: f64 = 0.6;

/// Obstacle snapshot used to steer units for one planning pass.
#[derive(Debug, Clone)]
pub struct Navigator {
    blocked: HashSet<Cell>,
    bounds: (i32, i32),
}

impl Navigator {
    /// Build from an explicit obstacle set.
    #[must_use]
    pub const fn new(blocked: HashSet<Cell>, bounds: (i32, i32)) -> Self {
        Self { blocked, bounds }
    }

    /// Walls and standing buildings of a world.
    #[must_use]
    pub fn for_world(world: &World) -> Self {
        Self::new(world.blocked_cells(), world.layout.bounds())
    }

    /// Walls of a duel arena.
    #[must_use]
    pub fn for_duel(duel: &Duel) -> Self {
        let bounds = grid_extent(duel.config.width, duel.config.height);
        Self::new(duel.walls.iter().copied().collect(), bounds)
    }

    /// Whether a cell is an obstacle.
    #[must_use]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.blocked.contains(&cell)
    }

    /// Replace a blocked goal with its free neighbour closest to `start`.
    ///
    /// Neighbours are compared by Manhattan distance, ties going to the
    /// first in [`Cell::neighbors`] order. A goal with no free neighbour is
    /// returned unchanged.
    #[must_use]
    pub fn nudge_goal(&self, goal: Cell, start: Cell) -> Cell {
        if !self.is_blocked(goal) {
            return goal;
        }
        let (width, height) = self.bounds;
        goal.neighbors()
            .into_iter()
            .filter(|c| c.in_bounds(width, height) && !self.is_blocked(*c))
            .min_by_key(|c| c.manhattan(start))
            .unwrap_or(goal)
    }

    /// Unit direction from `from` towards `target`.
    ///
    /// Heads straight for the target unless an obstacle sits just ahead, in
    /// which case it follows the first step of an A* route. With no route
    /// the straight-line direction is returned so the unit never stalls.
    #[must_use]
    pub fn steer(&self, from: Vec2, target: Vec2) -> Vec2 {
        let direct = from.direction_to(target);
        let probe = from + direct * PROBE_DISTANCE;
        if !self.is_blocked(probe.cell()) {
            return direct;
        }

        let start = from.cell();
        let goal = self.nudge_goal(target.cell(), start);
        match a_star(start, goal, &self.blocked, self.bounds).first() {
            Some(next) => from.direction_to(next.center()),
            None => direct,
        }
    }
}

/// The cardinal move closest to `direction`, or noop for a zero vector.
///
/// Horizontal wins only when strictly dominant.
#[must_use]
pub fn cardinal(direction: Vec2) -> ActionCommand {
    if direction.length() <= f64::EPSILON {
        ActionCommand::Noop
    } else if direction.x.abs() > direction.y.abs() {
        if direction.x > 0.0 { ActionCommand::RIGHT } else { ActionCommand::LEFT }
    } else if direction.y > 0.0 {
        ActionCommand::DOWN
    } else {
        ActionCommand::UP
    }
}
