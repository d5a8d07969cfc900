// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Jewelwar: a deterministic simulation core for capture-the-jewel games.
//!
//! Two rulesets share one set of primitives:
//! - [`game::World`]: several factions with squads, an economy, buildings,
//!   turrets and jewels, won by capture, domination or time-out score
//! - [`duel::Duel`]: one agent per side on a fixed mirrored arena, with
//!   weapon crafting in place of a team economy
//!
//! Both are driven one tick at a time by an external caller handing in an
//! [`ActionMap`]. Given the same seed and the same action stream, a match
//! always plays out identically.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   arena (rayon)   │   replay        │
//! ├─────────────────────────────────────┤
//! │   planner (SquadPlanner, ScriptBot) │
//! ├─────────────────────────────────────┤
//! │   game::World     │   duel::Duel    │
//! ├─────────────────────────────────────┤
//! │   mapgen  │ pathfinding │ geometry  │
//! └─────────────────────────────────────┘
//! ```

pub mod arena;
pub mod config;
pub mod duel;
pub mod error;
pub mod game;
pub mod geometry;
pub mod mapgen;
pub mod pathfinding;
pub mod planner;
pub mod replay;

pub use config::{DuelConfig, GameTuning};
pub use error::ConfigError;

// Re-export key game types at crate root for convenience
pub use game::{ActionCommand, ActionMap, ActionTable, StepResult, TeamId, UnitSlot, World};
