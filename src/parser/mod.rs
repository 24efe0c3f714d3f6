//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Finding the fault report in raw fuzzer output
//! - Normalizing stack frames
//! - Defining the report schema

pub mod normalize;
pub mod schema;
pub mod stacktrace;

// Re-export main types
pub use normalize::{is_stack_line, normalize_stack_line};
pub use schema::{CrashRecord, Counts, SignatureGroup, TriageReport};
pub use stacktrace::extract_stacktrace;
