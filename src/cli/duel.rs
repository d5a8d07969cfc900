//! Duel command implementation.

use std::path::PathBuf;

use jewelwar::arena::run_duel;
use jewelwar::planner::ScriptBot;
use tracing::info;

use super::output::format_match_text;
use super::{CliError, OutputFormat, load_duel_config, resolve_seed};

/// Execute the duel command.
///
/// # Errors
///
/// Returns an error if the config is invalid.
pub(crate) fn execute(
    config: Option<PathBuf>,
    seed: Option<u64>,
    max_time: Option<f64>,
    aggressiveness: [f64; 2],
    format: OutputFormat,
) -> Result<(), CliError> {
    let config = load_duel_config(config.as_deref(), max_time)?;
    let seed = resolve_seed(seed);
    info!(seed, aggr0 = aggressiveness[0], aggr1 = aggressiveness[1], "running duel");

    let bots = aggressiveness.map(ScriptBot::new);
    let result = run_duel(&config, seed, bots)?;

    match format {
        OutputFormat::Text => print!("{}", format_match_text("Duel", &result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}
