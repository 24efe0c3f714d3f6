//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod triage;
pub mod utils;

// Re-export main command functions
pub use models::{TriageArgs, TriageSummary};
pub use triage::{execute_triage, validate_args};
pub use utils::{check_report_consistency, display_schema, display_version, validate_report_file};
