//! Output formatting utilities for CLI.

#![allow(clippy::cast_precision_loss)]

use std::fmt::Write as _;

use jewelwar::arena::{MatchResult, SeriesStats};
use jewelwar::config::TEAM_PROFILES;
use serde::Serialize;

/// Display name for a team id.
fn team_name(team: usize) -> &'static str {
    TEAM_PROFILES.get(team).map_or("Unknown", |p| p.name)
}

/// Format a match result as human-readable text.
pub(super) fn format_match_text(title: &str, result: &MatchResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{title} (seed: {})", result.seed);
    match result.winner {
        Some(w) => {
            let _ = writeln!(output, "  Winner: Team {w} ({})", team_name(usize::from(w)));
        }
        None => output.push_str("  Winner: none\n"),
    }
    let _ = writeln!(output, "  Time: {:.1}s over {} ticks\n", result.time, result.ticks);

    for (team, held) in result.resources.iter().enumerate() {
        let _ = writeln!(output, "  Team {team} ({}): {held} resources", team_name(team));
    }
    output
}

/// JSON-serializable series result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSeriesResult {
    /// Matches played.
    pub(super) matches: u64,
    /// Matches without a winner.
    pub(super) undecided: u64,
    /// Mean match length in seconds.
    pub(super) avg_time: f64,
    /// Mean ticks per match.
    pub(super) avg_ticks: f64,
    /// Per-team results.
    pub(super) teams: Vec<JsonTeamResult>,
}

/// JSON-serializable team result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTeamResult {
    /// Team id.
    pub(super) id: usize,
    /// Display name.
    pub(super) name: &'static str,
    /// Wins.
    pub(super) wins: u64,
    /// Win rate (0.0-1.0).
    pub(super) win_rate: f64,
    /// Mean resources held at the end of a match.
    pub(super) avg_resources: f64,
}

impl JsonSeriesResult {
    /// Create from aggregated stats.
    pub(super) fn from_stats(stats: &SeriesStats) -> Self {
        Self {
            matches: stats.matches,
            undecided: stats.undecided,
            avg_time: stats.avg_time(),
            avg_ticks: stats.avg_ticks(),
            teams: (0..stats.wins.len())
                .map(|id| JsonTeamResult {
                    id,
                    name: team_name(id),
                    wins: stats.wins[id],
                    win_rate: stats.win_rate(id),
                    avg_resources: avg_resources(stats, id),
                })
                .collect(),
        }
    }
}

fn avg_resources(stats: &SeriesStats, team: usize) -> f64 {
    if stats.matches == 0 {
        return 0.0;
    }
    stats.total_resources.get(team).copied().unwrap_or(0) as f64 / stats.matches as f64
}

/// Format series stats as human-readable text.
pub(super) fn format_series_text(stats: &SeriesStats, elapsed_secs: f64) -> String {
    let mut output = String::new();

    let rate = if elapsed_secs > 0.0 {
        stats.matches as f64 / elapsed_secs
    } else {
        0.0
    };
    let _ = writeln!(
        output,
        "Series Results ({} matches in {elapsed_secs:.1}s, {rate:.1} matches/sec)\n",
        stats.matches
    );

    for team in 0..stats.wins.len() {
        let _ = writeln!(
            output,
            "  Team {team} ({:<6}): {:>6} wins ({:>5.1}%)  avg resources {:.1}",
            team_name(team),
            stats.wins[team],
            stats.win_rate(team) * 100.0,
            avg_resources(stats, team),
        );
    }
    let _ = writeln!(output, "  Undecided: {}", stats.undecided);
    let _ = writeln!(
        output,
        "\n  Average length: {:.1}s ({:.0} ticks)",
        stats.avg_time(),
        stats.avg_ticks()
    );
    output
}

/// Format series stats as CSV, one row per team.
pub(super) fn format_series_csv(stats: &SeriesStats) -> String {
    let mut output = String::from("team,name,wins,win_rate,avg_resources\n");
    for team in 0..stats.wins.len() {
        let _ = writeln!(
            output,
            "{team},{},{},{:.4},{:.2}",
            team_name(team),
            stats.wins[team],
            stats.win_rate(team),
            avg_resources(stats, team),
        );
    }
    output
}
