//! Jewelwar CLI - run scripted matches and tournaments headlessly.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Jewelwar - a deterministic capture-the-jewel simulation
#[derive(Parser, Debug)]
#[command(name = "jewelwar")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one multi-faction skirmish between squad planners
    Run {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Partial JSON tuning file
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Number of factions (2-8)
        #[arg(long)]
        teams: Option<usize>,

        /// Units per faction
        #[arg(long)]
        squad: Option<usize>,

        /// Match length in seconds
        #[arg(long)]
        max_time: Option<f64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save replay frames to file
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Ticks between replay frames
        #[arg(long, default_value = "30")]
        record_every: u64,
    },

    /// Play one two-faction duel between script bots
    Duel {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Partial JSON duel config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Match length in seconds
        #[arg(long)]
        max_time: Option<f64>,

        /// Attack probability of the west bot (0-1)
        #[arg(long, default_value = "0.6")]
        aggr0: f64,

        /// Attack probability of the east bot (0-1)
        #[arg(long, default_value = "0.6")]
        aggr1: f64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run many matches in parallel and aggregate statistics
    Tournament {
        /// Ruleset to play
        #[arg(short, long, default_value = "skirmish")]
        mode: cli::Mode,

        /// Number of matches to run (default: 100)
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each match)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Partial JSON tuning file (skirmish)
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Partial JSON duel config file (duel)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of factions (skirmish)
        #[arg(long)]
        teams: Option<usize>,

        /// Units per faction (skirmish)
        #[arg(long)]
        squad: Option<usize>,

        /// Match length in seconds
        #[arg(long)]
        max_time: Option<f64>,

        /// Attack probability of the west bot (duel)
        #[arg(long, default_value = "0.6")]
        aggr0: f64,

        /// Attack probability of the east bot (duel)
        #[arg(long, default_value = "0.6")]
        aggr1: f64,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jewelwar=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let result = match args.command {
        Commands::Run {
            seed,
            tuning,
            teams,
            squad,
            max_time,
            format,
            replay,
            record_every,
        } => {
            let overrides = cli::TuningOverrides {
                file: tuning,
                teams,
                squad,
                max_time,
            };
            cli::run::execute(&overrides, seed, format, replay, record_every)
        }

        Commands::Duel {
            seed,
            config,
            max_time,
            aggr0,
            aggr1,
            format,
        } => cli::duel::execute(config, seed, max_time, [aggr0, aggr1], format),

        Commands::Tournament {
            mode,
            games,
            seed,
            threads,
            tuning,
            config,
            teams,
            squad,
            max_time,
            aggr0,
            aggr1,
            format,
            progress,
        } => cli::tournament::execute(cli::tournament::TournamentArgs {
            mode,
            games,
            seed,
            threads,
            tuning: cli::TuningOverrides {
                file: tuning,
                teams,
                squad,
                max_time,
            },
            duel_config: config,
            aggressiveness: [aggr0, aggr1],
            format,
            progress,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
