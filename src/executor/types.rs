//! Types describing one run of the target program.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of reproducing one crash input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The target exited on its own (any exit code)
    Completed,
    /// The target was killed after exceeding the timeout
    TimedOut,
    /// The target could not be spawned or waited on
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::TimedOut => "timed_out",
            RunStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a run that terminated within its timeout
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    /// Process exit code; `-N` when killed by signal N
    pub exit_code: i32,

    /// stdout and stderr merged in write order
    pub output: String,

    /// Timeout that applied to this run
    pub timeout: Duration,

    /// Wall time from spawn to exit
    pub elapsed: Duration,
}
