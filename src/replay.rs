//! Line-oriented replay frames.
//!
//! A replay is a sequence of world snapshots, one per line:
//!
//! ```text
//! 0.5|{"time":0.5,"done":false,...}
//! ```
//!
//! The prefix is the simulation time in seconds, the suffix the
//! serde-serialized [`Snapshot`]. Frames can be written to and read from any
//! `Write`/`BufRead`, so files, buffers and pipes all work.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{Snapshot, World};

const SEPARATOR: char = '|';

/// One recorded instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Simulation clock in seconds.
    pub time: f64,
    /// World state at that time.
    pub snapshot: Snapshot,
}

impl ReplayFrame {
    /// Capture the world as it stands.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        Self {
            time: world.time,
            snapshot: world.snapshot(),
        }
    }
}

/// Failures while reading or writing replays.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Underlying reader or writer failed.
    #[error("replay I/O failed: {0}")]
    Io(#[from] io::Error),
    /// A line had no `time|json` separator.
    #[error("line {line}: missing '{SEPARATOR}' separator")]
    MissingSeparator {
        /// One-based line number.
        line: usize,
    },
    /// The time prefix was not a number.
    #[error("line {line}: bad timestamp {text:?}")]
    BadTime {
        /// One-based line number.
        line: usize,
        /// The offending prefix.
        text: String,
    },
    /// The snapshot did not parse.
    #[error("line {line}: bad snapshot: {source}")]
    Json {
        /// One-based line number.
        line: usize,
        /// Parser error.
        source: serde_json::Error,
    },
    /// A snapshot could not be encoded.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Write frames as `time|json` lines.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_frames<W: Write>(mut writer: W, frames: &[ReplayFrame]) -> Result<(), ReplayError> {
    for frame in frames {
        let json = serde_json::to_string(&frame.snapshot).map_err(ReplayError::Encode)?;
        writeln!(writer, "{}{SEPARATOR}{json}", frame.time)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse frames written by [`write_frames`]. Blank lines are skipped.
///
/// # Errors
///
/// Returns the first malformed line, or an I/O error.
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<ReplayFrame>, ReplayError> {
    let mut frames = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let number = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let (time, json) = line
            .split_once(SEPARATOR)
            .ok_or(ReplayError::MissingSeparator { line: number })?;
        let time = time.trim().parse::<f64>().map_err(|_| ReplayError::BadTime {
            line: number,
            text: time.to_string(),
        })?;
        let snapshot = serde_json::from_str(json).map_err(|source| ReplayError::Json {
            line: number,
            source,
        })?;
        frames.push(ReplayFrame { time, snapshot });
    }
    Ok(frames)
}
