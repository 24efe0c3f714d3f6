//! JSON report output writer.
//!
//! Writes TriageReport structs to JSON files with proper formatting.

use super::write_atomic;
use crate::parser::schema::TriageReport;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Write a triage report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let outcome = triage_batch(&config)?;
/// write_report(&outcome.report, "report.json")?;
/// ```
pub fn write_report(
    report: &TriageReport,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing JSON report to: {}", output_path.display());

    let json = report_to_string(report)?;
    write_atomic(output_path, json.as_bytes())?;

    debug!("JSON report written ({} bytes)", json.len());

    Ok(())
}

/// Serialize a report the way `write_report` does
///
/// **Public** - useful for tests and in-memory use
pub fn report_to_string(report: &TriageReport) -> Result<String, OutputError> {
    serde_json::to_string_pretty(report).map_err(OutputError::SerializationFailed)
}

/// Read a triage report from a JSON file
///
/// **Public** - used by `validate` and tests
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report(input_path: impl AsRef<Path>) -> Result<TriageReport, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;

    let report: TriageReport =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Report loaded: version {}, target {}, run {}",
        report.version, report.target, report.run_id
    );

    Ok(report)
}
