//! Deterministic map generation for the multi-faction world.
//!
//! `generate_map` is a pure function of `(tuning, team_count, seed)`. Two calls
//! with the same inputs return identical layouts on every platform, because all
//! randomness comes from a seeded `ChaCha8Rng`.

// Grid arithmetic mixes cell indices and world coordinates on purpose
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{
    GameTuning, MAX_TEAMS, MIN_TEAMS, MIN_WORLD_SIZE, ResourceKind, check_map_size,
    check_resource_target,
};
use crate::error::ConfigError;
use crate::geometry::{Cell, Vec2, grid_extent};

/// Number of random wall clusters.
const WALL_CLUSTERS: usize = 40;

/// Manhattan radius kept clear around every base and spawn.
const SAFE_ZONE_RADIUS: i32 = 4;

/// Resources may not appear inside this half-width box around a base.
const BASE_EXCLUSION: f64 = 3.5;

/// Placement attempts per requested resource node.
const ATTEMPTS_PER_RESOURCE: usize = 80;

/// Distance between a base and its spawn in the fixed layouts.
const SPAWN_OFFSET: f64 = 1.8;

/// A resource placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpot {
    /// What the node yields.
    pub kind: ResourceKind,
    /// Where it sits.
    pub pos: Vec2,
}

/// An immutable generated layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Impassable cells.
    pub walls: BTreeSet<Cell>,
    /// Base position per team.
    pub bases: Vec<Vec2>,
    /// Spawn position per team.
    pub spawns: Vec<Vec2>,
    /// Resource node placements in generation order.
    pub resource_spots: Vec<ResourceSpot>,
}

impl MapLayout {
    /// Grid bounds as signed cell counts.
    #[must_use]
    pub fn bounds(&self) -> (i32, i32) {
        grid_extent(self.width, self.height)
    }

    /// Whether the cell is a wall.
    #[must_use]
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.walls.contains(&cell)
    }
}

/// Generate a layout for `team_count` teams.
///
/// # Errors
///
/// Returns an error if the team count is unsupported or the map is too small
/// for the wall and base templates.
pub fn generate_map(
    tuning: &GameTuning,
    team_count: usize,
    seed: u64,
) -> Result<MapLayout, ConfigError> {
    if !(MIN_TEAMS..=MAX_TEAMS).contains(&team_count) {
        return Err(ConfigError::TeamCount {
            requested: team_count,
            min: MIN_TEAMS,
            max: MAX_TEAMS,
        });
    }
    check_map_size(tuning.width, tuning.height, MIN_WORLD_SIZE)?;
    check_resource_target(tuning.resources_on_map)?;
    if tuning.resource_types.is_empty() {
        return Err(ConfigError::NoResourceTypes);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let width = f64::from(tuning.width);
    let height = f64::from(tuning.height);

    let (bases, spawns) = if team_count <= 3 {
        let (mut bases, mut spawns) = triangular_bases(width, height);
        bases.truncate(team_count);
        spawns.truncate(team_count);
        (bases, spawns)
    } else {
        ring_bases(width, height, team_count, &mut rng)
    };

    let mut walls = random_walls(tuning, &mut rng);
    for pos in bases.iter().chain(&spawns) {
        carve_safe_zone(&mut walls, pos.cell());
    }

    let resource_spots = scatter_resources(tuning, &mut rng, &walls, &bases);

    tracing::debug!(
        seed,
        team_count,
        walls = walls.len(),
        resources = resource_spots.len(),
        "generated map"
    );

    Ok(MapLayout {
        width: tuning.width,
        height: tuning.height,
        walls,
        bases,
        spawns,
        resource_spots,
    })
}

/// Fixed triangle used for up to three teams.
fn triangular_bases(width: f64, height: f64) -> (Vec<Vec2>, Vec<Vec2>) {
    let bases = vec![
        Vec2::new(4.5, height * 0.25),
        Vec2::new(width - 4.5, height * 0.3),
        Vec2::new(width * 0.55, height - 5.0),
    ];
    let spawns = vec![
        Vec2::new(bases[0].x + SPAWN_OFFSET, bases[0].y),
        Vec2::new(bases[1].x - SPAWN_OFFSET, bases[1].y),
        Vec2::new(bases[2].x, bases[2].y - SPAWN_OFFSET),
    ];
    (bases, spawns)
}

/// Bases evenly spaced by angle on a jittered ring around the centre.
fn ring_bases(
    width: f64,
    height: f64,
    team_count: usize,
    rng: &mut ChaCha8Rng,
) -> (Vec<Vec2>, Vec<Vec2>) {
    let radius = width.min(height) * 0.35;
    let step = TAU / team_count as f64;
    let center = Vec2::new(width * 0.5, height * 0.5);

    let mut bases = Vec::with_capacity(team_count);
    let mut spawns = Vec::with_capacity(team_count);
    for i in 0..team_count {
        let angle = step * i as f64;
        let ring = radius * (0.92 + rng.random::<f64>() * 0.1);
        let base = center + Vec2::new(angle.cos(), angle.sin()) * ring;
        let spawn = base
            + Vec2::new(
                rng.random_range(-1.2..1.2),
                rng.random_range(-1.2..1.2),
            );
        bases.push(base);
        spawns.push(spawn);
    }
    (bases, spawns)
}

/// Random rectangular clusters plus a diamond of ruins in the middle.
fn random_walls(tuning: &GameTuning, rng: &mut ChaCha8Rng) -> BTreeSet<Cell> {
    let (w, h) = grid_extent(tuning.width, tuning.height);
    let mut walls = BTreeSet::new();

    for _ in 0..WALL_CLUSTERS {
        let cx = rng.random_range(6..=w - 7);
        let cy = rng.random_range(4..=h - 5);
        let size_x = rng.random_range(1..=3);
        let size_y = rng.random_range(1..=3);
        for dx in 0..=size_x {
            for dy in 0..=size_y {
                walls.insert(Cell::new(cx + dx, cy + dy));
            }
        }
    }

    let (mid_x, mid_y) = (w / 2, h / 2);
    for dx in -2..=2_i32 {
        for dy in -2..=2_i32 {
            if dx.abs() + dy.abs() <= 3 {
                walls.insert(Cell::new(mid_x + dx, mid_y + dy));
            }
        }
    }
    walls
}

fn carve_safe_zone(walls: &mut BTreeSet<Cell>, center: Cell) {
    for dx in -3..=3_i32 {
        for dy in -3..=3_i32 {
            if dx.abs() + dy.abs() <= SAFE_ZONE_RADIUS {
                walls.remove(&Cell::new(center.x + dx, center.y + dy));
            }
        }
    }
}

/// Rejection-sample resource nodes with a bounded attempt budget.
fn scatter_resources(
    tuning: &GameTuning,
    rng: &mut ChaCha8Rng,
    walls: &BTreeSet<Cell>,
    bases: &[Vec2],
) -> Vec<ResourceSpot> {
    let width = f64::from(tuning.width);
    let height = f64::from(tuning.height);
    let budget = tuning.resources_on_map * ATTEMPTS_PER_RESOURCE;
    let mut spots = Vec::with_capacity(tuning.resources_on_map);
    let mut attempts = 0;

    while spots.len() < tuning.resources_on_map && attempts < budget {
        attempts += 1;
        let pos = Vec2::new(
            rng.random_range(3.0..width - 3.0),
            rng.random_range(2.0..height - 2.0),
        );
        if walls.contains(&pos.cell()) {
            continue;
        }
        if bases
            .iter()
            .any(|b| (pos.x - b.x).abs() < BASE_EXCLUSION && (pos.y - b.y).abs() < BASE_EXCLUSION)
        {
            continue;
        }

        let Some(&rolled) = tuning.resource_types.choose(rng) else {
            break;
        };
        // The contested centre is richer in metal and fuel
        let central = (pos.x - width * 0.5).abs() < width * 0.15
            && (pos.y - height * 0.5).abs() < height * 0.15;
        let kind = if central {
            [ResourceKind::Metal, ResourceKind::Metal, ResourceKind::Fuel, rolled]
                .choose(rng)
                .copied()
                .unwrap_or(rolled)
        } else {
            rolled
        };
        spots.push(ResourceSpot { kind, pos });
    }
    spots
}
