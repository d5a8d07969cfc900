//! Headless match runners.
//!
//! A runner plays one match to completion with scripted controllers on every
//! side and reports a [`MatchResult`]. [`run_series`] fans many independent
//! seeds out over the rayon pool; each match owns its world and RNG, so
//! results do not depend on thread count or scheduling.

#![allow(clippy::cast_precision_loss)]

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DuelConfig, GameTuning};
use crate::duel::{DUEL_TEAMS, Duel};
use crate::error::ConfigError;
use crate::game::{ActionMap, Loadout, TeamId, UnitSlot, World, assert_invariants};
use crate::planner::{ScriptBot, SquadPlanner};
use crate::replay::ReplayFrame;

/// Bots draw from their own stream so they never share draws with the arena.
const BOT_RNG_STREAM: u64 = 2;

/// Outcome of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Seed the match was built from.
    pub seed: u64,
    /// Winning team, `None` if the tick budget ran out first.
    pub winner: Option<TeamId>,
    /// Simulation clock at the end.
    pub time: f64,
    /// Ticks stepped.
    pub ticks: u64,
    /// Resources held per team at the end.
    pub resources: Vec<u32>,
}

/// Options for a multi-faction skirmish.
#[derive(Debug, Clone, Default)]
pub struct SkirmishOptions {
    /// Per-team class lists.
    pub loadout: Option<Loadout>,
    /// Record a replay frame every this many ticks; `0` disables recording.
    pub record_every: u64,
}

/// Play a scripted multi-faction match.
///
/// # Errors
///
/// Returns an error if the tuning is invalid.
pub fn run_skirmish(tuning: &GameTuning, seed: u64) -> Result<MatchResult, ConfigError> {
    run_skirmish_with(tuning, seed, &SkirmishOptions::default()).map(|(result, _)| result)
}

/// Play a scripted multi-faction match and keep replay frames.
///
/// The first and last frames are always recorded when recording is on.
///
/// # Errors
///
/// Returns an error if the tuning is invalid.
pub fn run_skirmish_with(
    tuning: &GameTuning,
    seed: u64,
    options: &SkirmishOptions,
) -> Result<(MatchResult, Vec<ReplayFrame>), ConfigError> {
    let mut world = World::new(tuning.clone(), seed, options.loadout.as_ref())?;
    let planners: Vec<SquadPlanner> = world.teams.iter().map(|t| SquadPlanner::new(t.id)).collect();
    let dt = tuning.tick_dt();
    let tick_limit = tuning.max_ticks().saturating_mul(2);
    let recording = options.record_every > 0;

    let mut frames = Vec::new();
    if recording {
        frames.push(ReplayFrame::capture(&world));
    }

    let mut ticks = 0;
    while !world.done && ticks < tick_limit {
        let mut actions = ActionMap::new();
        for planner in &planners {
            actions.extend(planner.plan(&world));
        }
        world.step(&actions, dt);
        ticks += 1;
        assert_invariants(&world);

        if recording && (ticks % options.record_every == 0 || world.done) {
            frames.push(ReplayFrame::capture(&world));
        }
    }

    let result = MatchResult {
        seed,
        winner: world.winner,
        time: world.time,
        ticks,
        resources: world.teams.iter().map(|t| t.ledger.total()).collect(),
    };
    debug!(seed, winner = ?result.winner, ticks, "skirmish finished");
    Ok((result, frames))
}

/// Play a duel between two scripted bots.
///
/// # Errors
///
/// Returns an error if the config is invalid.
pub fn run_duel(config: &DuelConfig, seed: u64, bots: [ScriptBot; 2]) -> Result<MatchResult, ConfigError> {
    let mut duel = Duel::new(config.clone(), seed)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(BOT_RNG_STREAM);
    let dt = config.tick_dt();
    let tick_limit = config.max_ticks().saturating_mul(2);

    let mut ticks = 0;
    while !duel.done && ticks < tick_limit {
        let mut actions = ActionMap::new();
        for (team, bot) in DUEL_TEAMS.into_iter().zip(&bots) {
            actions.insert(UnitSlot::new(team, 0), bot.decide(&duel, team, &mut rng));
        }
        duel.step(&actions, dt);
        ticks += 1;
    }

    let result = MatchResult {
        seed,
        winner: duel.winner,
        time: duel.time,
        ticks,
        resources: duel.agents.iter().map(|a| a.resources).collect(),
    };
    debug!(seed, winner = ?result.winner, ticks, "duel finished");
    Ok(result)
}

/// Aggregated results of many matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Matches played.
    pub matches: u64,
    /// Wins per team.
    pub wins: Vec<u64>,
    /// Matches that ran out of ticks undecided.
    pub undecided: u64,
    /// Ticks across all matches.
    pub total_ticks: u64,
    /// Simulated seconds across all matches.
    pub total_time: f64,
    /// Final resources per team, summed over matches.
    pub total_resources: Vec<u64>,
}

impl SeriesStats {
    /// Empty stats for `teams` teams.
    #[must_use]
    pub fn new(teams: usize) -> Self {
        Self {
            matches: 0,
            wins: vec![0; teams],
            undecided: 0,
            total_ticks: 0,
            total_time: 0.0,
            total_resources: vec![0; teams],
        }
    }

    /// Fold in one match.
    pub fn add_result(&mut self, result: &MatchResult) {
        self.matches += 1;
        self.total_ticks += result.ticks;
        self.total_time += result.time;

        match result.winner.map(usize::from) {
            Some(w) if w < self.wins.len() => self.wins[w] += 1,
            Some(_) => {}
            None => self.undecided += 1,
        }
        for (total, &held) in self.total_resources.iter_mut().zip(&result.resources) {
            *total += u64::from(held);
        }
    }

    /// Combine with stats gathered elsewhere.
    pub fn merge(&mut self, other: &Self) {
        self.matches += other.matches;
        self.undecided += other.undecided;
        self.total_ticks += other.total_ticks;
        self.total_time += other.total_time;
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.total_resources.iter_mut().zip(&other.total_resources) {
            *a += b;
        }
    }

    /// Share of matches won by `team`, in `[0, 1]`.
    #[must_use]
    pub fn win_rate(&self, team: usize) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        self.wins.get(team).copied().unwrap_or(0) as f64 / self.matches as f64
    }

    /// Mean match length in seconds.
    #[must_use]
    pub fn avg_time(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        self.total_time / self.matches as f64
    }

    /// Mean ticks per match.
    #[must_use]
    pub fn avg_ticks(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.matches as f64
    }
}

/// Run `runner` for every seed in parallel and aggregate the results.
///
/// # Errors
///
/// Returns the first error any runner reports.
pub fn run_series<F>(seeds: &[u64], teams: usize, runner: F) -> Result<SeriesStats, ConfigError>
where
    F: Fn(u64) -> Result<MatchResult, ConfigError> + Sync,
{
    let stats = seeds
        .par_iter()
        .try_fold(
            || SeriesStats::new(teams),
            |mut stats, &seed| {
                stats.add_result(&runner(seed)?);
                Ok::<_, ConfigError>(stats)
            },
        )
        .try_reduce(
            || SeriesStats::new(teams),
            |mut a, b| {
                a.merge(&b);
                Ok(a)
            },
        )?;
    info!(matches = stats.matches, undecided = stats.undecided, "series finished");
    Ok(stats)
}
