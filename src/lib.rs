//! Fuzz Triage
//!
//! Re-runs the crash inputs of a fuzzing run against the fuzzer binary,
//! extracts and normalizes the sanitizer stack traces, groups crashes by
//! signature and writes JSON and Markdown reports.
//!
//! This crate provides the core implementation for the
//! `fuzz-triage` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! fuzz-triage triage --target cjson --run runs/2024-06-01T12-00-00
//! ```

pub mod aggregator;
pub mod commands;
pub mod executor;
pub mod output;
pub mod parser;
pub mod utils;
