//! Fixed duel arena: mirrored walls, bases, spawns and seeded resources.

use std::collections::BTreeSet;

use rand::Rng;

use crate::config::{DuelConfig, ResourceKind};
use crate::game::ResourceNode;
use crate::geometry::{Cell, Vec2, grid_extent};

/// Spacing of the 2x2 wall blocks.
const BLOCK_STRIDE: usize = 6;

/// Resources keep at least this far from either base.
const BASE_CLEARANCE: f64 = 4.0;

/// Upper bound on resource placement attempts.
const SCATTER_ATTEMPTS: usize = 5000;

/// Wall blocks mirrored about the vertical centre line, plus sparse blockers
/// down the centre column.
#[must_use]
pub fn mirrored_walls(width: u32, height: u32) -> BTreeSet<Cell> {
    let (w, h) = grid_extent(width, height);
    let mut walls = BTreeSet::new();

    for x in (8..w - 8).step_by(BLOCK_STRIDE) {
        for y in (3..h - 3).step_by(BLOCK_STRIDE) {
            for dx in 0..2 {
                for dy in 0..2 {
                    walls.insert(Cell::new(x + dx, y + dy));
                    walls.insert(Cell::new(w - 1 - (x + dx), y + dy));
                }
            }
        }
    }

    let mid = w / 2;
    for y in (2..h - 2).step_by(4) {
        if y % 8 != 0 {
            walls.insert(Cell::new(mid, y));
        }
    }
    walls
}

/// Home bases for team 0 (west) and team 1 (east).
#[must_use]
pub fn bases(width: u32, height: u32) -> [Vec2; 2] {
    let mid = f64::from(height) / 2.0;
    [
        Vec2::new(2.0, mid),
        Vec2::new(f64::from(width) - 3.0, mid),
    ]
}

/// Spawn points, just inside each base.
#[must_use]
pub fn spawns(width: u32, height: u32) -> [Vec2; 2] {
    let mid = f64::from(height) / 2.0;
    [
        Vec2::new(3.5, mid),
        Vec2::new(f64::from(width) - 4.5, mid),
    ]
}

/// Scatter up to `resources_on_map` nodes away from walls and bases.
///
/// Gives up after a fixed number of attempts, so crowded maps get fewer nodes.
#[allow(clippy::cast_possible_truncation)]
pub fn scatter_resources<R: Rng + ?Sized>(
    config: &DuelConfig,
    walls: &BTreeSet<Cell>,
    bases: &[Vec2; 2],
    rng: &mut R,
) -> Vec<ResourceNode> {
    let x_range = 4.0..f64::from(config.width) - 5.0;
    let y_range = 2.0..f64::from(config.height) - 3.0;
    let mut nodes = Vec::with_capacity(config.resources_on_map);

    for _ in 0..SCATTER_ATTEMPTS {
        if nodes.len() >= config.resources_on_map {
            break;
        }
        let pos = Vec2::new(
            rng.random_range(x_range.clone()),
            rng.random_range(y_range.clone()),
        );
        if walls.contains(&pos.cell()) {
            continue;
        }
        if bases.iter().any(|b| pos.distance(*b) < BASE_CLEARANCE) {
            continue;
        }
        nodes.push(ResourceNode::new(nodes.len() as u32, ResourceKind::Wood, pos));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_walls_are_mirrored() {
        let walls = mirrored_walls(30, 18);
        assert!(!walls.is_empty());
        for cell in &walls {
            if cell.x == 15 {
                continue;
            }
            let mirror = Cell::new(29 - cell.x, cell.y);
            assert!(walls.contains(&mirror), "{cell:?} has no mirror");
        }
    }

    #[test]
    fn test_centre_column_blockers() {
        let walls = mirrored_walls(30, 18);
        for y in [2, 6, 10, 14] {
            assert!(walls.contains(&Cell::new(15, y)));
        }
        assert!(!walls.contains(&Cell::new(15, 8)));
    }

    #[test]
    fn test_bases_and_spawns_are_open() {
        let walls = mirrored_walls(30, 18);
        for pos in bases(30, 18).iter().chain(&spawns(30, 18)) {
            assert!(!walls.contains(&pos.cell()));
        }
    }

    #[test]
    fn test_scatter_respects_clearance() {
        let config = DuelConfig::default();
        let walls = mirrored_walls(config.width, config.height);
        let bases = bases(config.width, config.height);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let nodes = scatter_resources(&config, &walls, &bases, &mut rng);
        assert_eq!(nodes.len(), config.resources_on_map);
        for node in &nodes {
            assert!(!walls.contains(&node.pos.cell()));
            assert!(bases.iter().all(|b| node.pos.distance(*b) >= BASE_CLEARANCE));
        }
    }

    #[test]
    fn test_scatter_gives_up_when_crowded() {
        let config = DuelConfig {
            width: 12,
            height: 8,
            resources_on_map: 100,
            ..DuelConfig::default()
        };
        let walls = mirrored_walls(config.width, config.height);
        let bases = bases(config.width, config.height);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // Almost every candidate lies within 4.0 of a base on this map
        let nodes = scatter_resources(&config, &walls, &bases, &mut rng);
        assert!(nodes.len() < 100);
    }
}
