//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single stack sample could not be taken.
///
/// All of these are local to one timer tick: the sample is dropped and the
/// capture window carries on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkError {
    #[error("Invalid stack frame address: 0x{address:08x}")]
    InvalidFrame { address: u32 },

    #[error("Target thread is unavailable")]
    ThreadUnavailable,

    #[error("Stack walk produced no frames")]
    EmptyStack,
}

/// Errors that can occur while writing or reading capture files
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to open {path} for writing: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Malformed folded stack on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Errors that can occur while loading or validating settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range ({min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while loading or running a replay scenario
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scenario settings are invalid: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}
