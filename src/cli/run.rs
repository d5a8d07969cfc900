//! Run command implementation.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use jewelwar::arena::{SkirmishOptions, run_skirmish_with};
use jewelwar::replay::write_frames;
use tracing::info;

use super::output::format_match_text;
use super::{CliError, OutputFormat, TuningOverrides, load_tuning, resolve_seed};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the tuning is invalid or the replay cannot be saved.
pub(crate) fn execute(
    overrides: &TuningOverrides,
    seed: Option<u64>,
    format: OutputFormat,
    replay: Option<PathBuf>,
    record_every: u64,
) -> Result<(), CliError> {
    let tuning = load_tuning(overrides)?;
    let seed = resolve_seed(seed);
    info!(seed, teams = tuning.team_count, squad = tuning.squad_size, "running skirmish");

    let options = SkirmishOptions {
        loadout: None,
        record_every: if replay.is_some() { record_every.max(1) } else { 0 },
    };
    let (result, frames) = run_skirmish_with(&tuning, seed, &options)?;

    if let Some(path) = replay {
        let file = File::create(&path).map_err(|source| CliError::File {
            path: path.clone(),
            source,
        })?;
        write_frames(BufWriter::new(file), &frames)?;
        info!(frames = frames.len(), path = %path.display(), "replay saved");
    }

    match format {
        OutputFormat::Text => print!("{}", format_match_text("Skirmish", &result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}
