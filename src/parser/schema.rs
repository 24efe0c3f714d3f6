//! Output JSON schema definitions for triage reports.
//!
//! This module defines the structure of `report.json`.
//! Schema is versioned to allow future evolution.

use crate::executor::RunStatus;
use serde::{Deserialize, Serialize};

/// Top-level triage report written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Target whose crashes were triaged
    pub target: String,

    /// Run directory that held the crashes
    pub run_dir: String,

    /// Run identifier (the run directory's name)
    pub run_id: String,

    /// RFC 3339 timestamp in UTC
    pub generated_at: String,

    /// Per-execution timeout that applied
    pub timeout_secs: u64,

    /// Free-form run metadata (`meta.json`), if any
    #[serde(default)]
    pub meta: Option<serde_json::Value>,

    pub counts: Counts,

    /// Groups ordered by size (desc), then hash (asc)
    pub signatures: Vec<SignatureGroup>,

    /// One record per crash input, in processing order
    pub crashes: Vec<CrashRecord>,
}

/// Summary counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub total_crashes: usize,
    pub unique_signatures: usize,
}

/// Crash inputs sharing one signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureGroup {
    pub signature_hash: String,

    /// Member file names, in processing order
    pub crashes: Vec<String>,
}

/// Per-input triage detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashRecord {
    pub crash_file: String,
    pub crash_path: String,
    pub status: RunStatus,

    /// `None` when the run did not complete
    pub exit_code: Option<i32>,

    pub signature_hash: String,

    /// Normalized frames, innermost first
    pub stacktrace: Vec<String>,

    /// Raw captured output of this run
    pub log_path: String,
}
