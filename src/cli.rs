//! CLI command implementations for jewelwar.

pub(crate) mod duel;
pub(crate) mod run;
pub(crate) mod tournament;

mod output;

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use jewelwar::replay::ReplayError;
use jewelwar::{ConfigError, DuelConfig, GameTuning};
use thiserror::Error;

/// Output format for single matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `tournament` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TournamentFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Which ruleset a tournament plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Mode {
    /// Multi-faction skirmishes between squad planners.
    Skirmish,
    /// Two-faction duels between script bots.
    Duel,
}

/// CLI error type.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Tuning or config rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// File could not be read or written.
    #[error("{}: {source}", path.display())]
    File {
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },
    /// Replay could not be written.
    #[error(transparent)]
    Replay(#[from] ReplayError),
    /// Output could not be encoded.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Overrides shared by commands that build a [`GameTuning`].
#[derive(Debug, Clone, Default)]
pub(crate) struct TuningOverrides {
    /// Partial JSON tuning file.
    pub(crate) file: Option<PathBuf>,
    /// Number of factions.
    pub(crate) teams: Option<usize>,
    /// Units per faction.
    pub(crate) squad: Option<usize>,
    /// Match length in seconds.
    pub(crate) max_time: Option<f64>,
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Defaults, then the tuning file, then flags.
pub(crate) fn load_tuning(overrides: &TuningOverrides) -> Result<GameTuning, CliError> {
    let mut tuning = match &overrides.file {
        Some(path) => GameTuning::from_json_str(&read_file(path)?)?,
        None => GameTuning::default(),
    };
    if let Some(teams) = overrides.teams {
        tuning.team_count = teams;
    }
    if let Some(squad) = overrides.squad {
        tuning.squad_size = squad;
    }
    if let Some(max_time) = overrides.max_time {
        tuning.max_time_s = max_time;
    }
    tuning.validate()?;
    Ok(tuning)
}

/// Defaults, then the config file, then flags.
pub(crate) fn load_duel_config(file: Option<&Path>, max_time: Option<f64>) -> Result<DuelConfig, CliError> {
    let mut config = match file {
        Some(path) => DuelConfig::from_json_str(&read_file(path)?)?,
        None => DuelConfig::default(),
    };
    if let Some(max_time) = max_time {
        config.max_time_s = max_time;
    }
    config.validate()?;
    Ok(config)
}

/// The given seed, or one derived from the clock.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    })
}
