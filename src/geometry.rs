//! Continuous positions and grid cells.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Slack applied to inclusive radius tests so a unit standing exactly on a
/// boundary is not rejected by floating-point rounding.
pub const RADIUS_EPSILON: f64 = 1e-9;

/// A position or displacement in world units (one unit = one grid cell).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component (grows downwards).
    pub y: f64,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Inclusive radius test: `distance <= radius`.
    #[must_use]
    pub fn within(self, other: Self, radius: f64) -> bool {
        self.distance(other) <= radius + RADIUS_EPSILON
    }

    /// Unit vector in the same direction, or `None` when the vector is
    /// shorter than `min_length`.
    #[must_use]
    pub fn normalized(self, min_length: f64) -> Option<Self> {
        let len = self.length();
        if len > min_length && len.is_finite() {
            Some(Self::new(self.x / len, self.y / len))
        } else {
            None
        }
    }

    /// Unit direction from `self` towards `target` (zero when coincident).
    #[must_use]
    pub fn direction_to(self, target: Self) -> Self {
        (target - self).normalized(1e-5).unwrap_or(Self::ZERO)
    }

    /// The grid cell containing this point.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell(self) -> Cell {
        Cell::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// A grid cell.
///
/// Signed so neighbour arithmetic can step off the map; bounds are checked by
/// whoever consumes the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// Create a new cell.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbours: right, left, down, up.
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            Self::new(self.x + 1, self.y),
            Self::new(self.x - 1, self.y),
            Self::new(self.x, self.y + 1),
            Self::new(self.x, self.y - 1),
        ]
    }

    /// Manhattan distance.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Centre of the cell in world units.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(f64::from(self.x) + 0.5, f64::from(self.y) + 0.5)
    }

    /// Whether the cell lies inside a `width` x `height` grid.
    #[must_use]
    pub const fn in_bounds(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }
}

/// Grid extent as signed cell counts, saturating at `i32::MAX`.
#[must_use]
pub fn grid_extent(width: u32, height: u32) -> (i32, i32) {
    (
        i32::try_from(width).unwrap_or(i32::MAX),
        i32::try_from(height).unwrap_or(i32::MAX),
    )
}
