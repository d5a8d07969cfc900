//! Construction-time error types.
//!
//! Gameplay never fails: illegal actions are ignored inside the tick. The only
//! failures surfaced to callers are configuration problems detected while a
//! world, duel, or map is being set up.

use thiserror::Error;

/// Configuration rejected while building a world or map.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Requested team count is outside the supported range.
    #[error("team count {requested} outside supported range {min}..={max}")]
    TeamCount {
        /// Number of teams requested.
        requested: usize,
        /// Smallest supported team count.
        min: usize,
        /// Largest supported team count.
        max: usize,
    },
    /// Map dimensions too small to lay out bases and walls.
    #[error("map {width}x{height} is smaller than the minimum {min_width}x{min_height}")]
    MapTooSmall {
        /// Requested width in cells.
        width: u32,
        /// Requested height in cells.
        height: u32,
        /// Minimum width in cells.
        min_width: u32,
        /// Minimum height in cells.
        min_height: u32,
    },
    /// A tuning value that must be positive was zero, negative, or not finite.
    #[error("tuning value `{field}` must be positive and finite, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Map dimensions beyond the supported grid.
    #[error("map {width}x{height} exceeds the maximum side of {max} cells")]
    MapTooLarge {
        /// Requested width in cells.
        width: u32,
        /// Requested height in cells.
        height: u32,
        /// Largest supported side in cells.
        max: u32,
    },
    /// Squad larger than the supported maximum.
    #[error("squad size {requested} exceeds the maximum of {max}")]
    SquadTooLarge {
        /// Units per team requested.
        requested: usize,
        /// Largest supported squad.
        max: usize,
    },
    /// Resource target larger than the supported maximum.
    #[error("{requested} resource nodes requested, at most {max} supported")]
    TooManyResources {
        /// Nodes requested.
        requested: usize,
        /// Largest supported target.
        max: usize,
    },
    /// Squads must contain at least one unit.
    #[error("squad size must be at least 1")]
    EmptySquad,
    /// The resource catalogue used for scattering is empty.
    #[error("at least one resource type is required")]
    NoResourceTypes,
    /// Tuning file could not be parsed.
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reject values that are not strictly positive and finite.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
