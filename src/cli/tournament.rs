//! Tournament command implementation.

use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use jewelwar::arena::{MatchResult, run_duel, run_series, run_skirmish};
use jewelwar::planner::ScriptBot;
use jewelwar::ConfigError;
use tracing::{info, warn};

use super::output::{JsonSeriesResult, format_series_csv, format_series_text};
use super::{CliError, Mode, TournamentFormat, TuningOverrides, load_duel_config, load_tuning, resolve_seed};

/// Tournament settings gathered from the command line.
#[derive(Debug, Clone)]
pub(crate) struct TournamentArgs {
    /// Ruleset to play.
    pub(crate) mode: Mode,
    /// Number of matches.
    pub(crate) games: u64,
    /// First seed; match `i` uses `seed + i`.
    pub(crate) seed: Option<u64>,
    /// Worker threads (default: CPU count).
    pub(crate) threads: Option<usize>,
    /// Skirmish tuning overrides.
    pub(crate) tuning: TuningOverrides,
    /// Duel config file.
    pub(crate) duel_config: Option<PathBuf>,
    /// Duel bot aggressiveness per side.
    pub(crate) aggressiveness: [f64; 2],
    /// Output format.
    pub(crate) format: TournamentFormat,
    /// Show progress bar.
    pub(crate) progress: bool,
}

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if the settings are invalid or output cannot be encoded.
pub(crate) fn execute(args: TournamentArgs) -> Result<(), CliError> {
    if args.games == 0 {
        return Err(CliError::Other("games must be at least 1".to_string()));
    }

    if let Some(num_threads) = args.threads {
        if rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .is_err()
        {
            warn!(num_threads, "thread pool already initialized");
        }
    }

    let base_seed = resolve_seed(args.seed);
    let seeds: Vec<u64> = (0..args.games).map(|i| base_seed.wrapping_add(i)).collect();

    let pb = if args.progress {
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} matches ({per_sec})",
        )
        .map_err(|e| CliError::Other(format!("bad progress template: {e}")))?
        .progress_chars("=>-");
        Some(ProgressBar::new(args.games).with_style(style))
    } else {
        None
    };
    let tick = |result: Result<MatchResult, ConfigError>| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
        result
    };

    info!(mode = ?args.mode, games = args.games, base_seed, "tournament started");
    let start = Instant::now();
    let stats = match args.mode {
        Mode::Skirmish => {
            let tuning = load_tuning(&args.tuning)?;
            run_series(&seeds, tuning.team_count, |seed| tick(run_skirmish(&tuning, seed)))?
        }
        Mode::Duel => {
            let config = load_duel_config(args.duel_config.as_deref(), args.tuning.max_time)?;
            let bots = args.aggressiveness.map(ScriptBot::new);
            run_series(&seeds, 2, |seed| tick(run_duel(&config, seed, bots)))?
        }
    };
    if let Some(pb) = &pb {
        pb.finish_with_message("done");
    }
    let elapsed = start.elapsed().as_secs_f64();

    match args.format {
        TournamentFormat::Text => {
            println!();
            print!("{}", format_series_text(&stats, elapsed));
        }
        TournamentFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonSeriesResult::from_stats(&stats))?;
            println!("{json}");
        }
        TournamentFormat::Csv => print!("{}", format_series_csv(&stats)),
    }
    Ok(())
}
