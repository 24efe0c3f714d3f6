//! Aggregation of crash reproductions into a grouped triage report.
//!
//! This module turns a directory of crash inputs into:
//! - One classified record per input (status, trace, signature)
//! - Signature groups (deduplicated crashes)
//! - Summary counts

pub mod batch;
pub mod grouping;
pub mod signature;

// Re-export main types and functions
pub use batch::{
    list_crash_inputs, load_meta, log_path_for, triage_batch, BatchConfig, BatchOutcome,
    CrashInput,
};
pub use grouping::{count, group_by_signature, sort_groups};
pub use signature::{sha256_hex, short_hash, Signature};
