//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running the target against one input
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to spawn {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for child process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Failed to capture child output: {0}")]
    Capture(#[source] std::io::Error),

    /// The child was killed after exceeding the timeout.
    /// `output` holds whatever it printed before the kill.
    #[error("Execution timed out after {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration, output: String },
}

/// Configuration errors: fatal, raised before any per-input work
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Crashes directory not found: {}", .0.display())]
    CrashesDirMissing(PathBuf),

    #[error("Fuzzer binary not found: {} (did you build?)", .0.display())]
    FuzzerMissing(PathBuf),

    #[error("Fuzzer binary is not executable: {}", .0.display())]
    FuzzerNotExecutable(PathBuf),

    #[error("Cannot start fuzzer {}: {source}", .path.display())]
    FuzzerSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid metadata document {}: {source}", .path.display())]
    InvalidMeta {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Batch-level failure of a triage run
#[derive(Error, Debug)]
pub enum TriageError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to list crash inputs in {}: {source}", .dir.display())]
    ListInputs {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write artifact {}: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
}
