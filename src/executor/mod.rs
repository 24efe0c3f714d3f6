//! Process execution of the target program.
//!
//! This module handles:
//! - Spawning the fuzzer binary with one crash input
//! - Merging stdout/stderr into a single capture
//! - Enforcing the per-run timeout

pub mod runner;
pub mod types;

// Re-export main types
pub use runner::run_target;
pub use types::{ExecutionRecord, RunStatus};
