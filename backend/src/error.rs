//! Error kinds shared across the sequencer, racks, parsers and storage
//!
//! Boundary conditions (an exhausted supply rack, a full placement rack) are
//! NOT errors: those are reported as `None` by the rack API. Everything in
//! this enum is a genuine failure.

use thiserror::Error;

/// Errors that can occur while configuring, loading or driving a run
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SequencerError {
    /// Rack corner must be row 1 or 8 and column 1 or 12
    #[error("Invalid tip rack origin: row {row}, column {column}")]
    InvalidOrigin { row: u8, column: u8 },

    /// Parser selection key not recognised
    #[error("Unknown parse mode: \"{0}\"")]
    UnknownMode(String),

    /// Malformed record, bad coordinate, non-numeric volume, unknown index
    #[error("Unable to parse transfer table (line {line}): {message}")]
    Parse { line: usize, message: String },

    /// File read/write failure
    #[error("I/O failure on {path}: {message}")]
    Io { path: String, message: String },

    /// Configuration values out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// `advance` called without a successfully loaded operation list
    #[error("No transfer list loaded")]
    NotLoaded,

    /// A `StepPlan` was committed after the state it was taken from changed
    #[error("Step plan is stale: sequencer state changed since it was peeked")]
    StaleStep,

    /// Snapshot could not be produced or does not match the loaded run
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
}

impl SequencerError {
    /// Build a parse error for a 1-based input line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        SequencerError::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &str, err: impl std::fmt::Display) -> Self {
        SequencerError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}
