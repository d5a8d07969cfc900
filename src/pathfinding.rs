//! Grid A* over orthogonal moves.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::geometry::Cell;

/// Shortest orthogonal path from `start` to `goal`.
///
/// The returned cells begin with the first step after `start` and end with
/// `goal`. The path is empty when `start == goal` or when the goal cannot be
/// reached. Every step costs 1 and the Manhattan distance is the heuristic.
/// `bounds` is `(width, height)`; cells outside it are never entered.
///
/// Ties on estimated cost are broken by cell order, so the result is a pure
/// function of the inputs.
#[must_use]
pub fn a_star(start: Cell, goal: Cell, blocked: &HashSet<Cell>, bounds: (i32, i32)) -> Vec<Cell> {
    let (width, height) = bounds;
    if start == goal || !goal.in_bounds(width, height) || blocked.contains(&goal) {
        return Vec::new();
    }

    let mut g_score: HashMap<Cell, u32> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut open: BinaryHeap<Reverse<(u32, u32, Cell)>> = BinaryHeap::new();

    g_score.insert(start, 0);
    open.push(Reverse((start.manhattan(goal), 0, start)));

    while let Some(Reverse((_, cost, current))) = open.pop() {
        if g_score.get(&current).is_some_and(|&best| cost > best) {
            continue;
        }
        if current == goal {
            return reconstruct(&came_from, start, goal);
        }

        for next in current.neighbors() {
            if !next.in_bounds(width, height) || blocked.contains(&next) {
                continue;
            }
            let tentative = cost + 1;
            if g_score.get(&next).is_none_or(|&known| tentative < known) {
                g_score.insert(next, tentative);
                came_from.insert(next, current);
                open.push(Reverse((tentative + next.manhattan(goal), tentative, next)));
            }
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
