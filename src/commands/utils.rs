use crate::output::read_report;
use crate::parser::schema::TriageReport;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;
    check_report_consistency(&report)?;

    println!("✓ Valid triage report");
    println!("  Version: {}", report.version);
    println!("  Target: {}", report.target);
    println!("  Run: {}", report.run_id);
    println!("  Total crashes: {}", report.counts.total_crashes);
    println!("  Unique signatures: {}", report.counts.unique_signatures);

    Ok(())
}

/// Check the invariants a report written by `triage` always holds
pub fn check_report_consistency(report: &TriageReport) -> Result<()> {
    if report.counts.total_crashes != report.crashes.len() {
        anyhow::bail!(
            "total_crashes is {} but {} crash records are present",
            report.counts.total_crashes,
            report.crashes.len()
        );
    }

    if report.counts.unique_signatures != report.signatures.len() {
        anyhow::bail!(
            "unique_signatures is {} but {} groups are present",
            report.counts.unique_signatures,
            report.signatures.len()
        );
    }

    let mut seen = HashSet::new();
    for group in &report.signatures {
        for name in &group.crashes {
            if !seen.insert(name.as_str()) {
                anyhow::bail!("Crash {} appears in more than one group", name);
            }
        }
    }
    if seen.len() != report.crashes.len() {
        anyhow::bail!(
            "Groups cover {} crashes, expected {}",
            seen.len(),
            report.crashes.len()
        );
    }

    for pair in report.signatures.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ordered = a.crashes.len() > b.crashes.len()
            || (a.crashes.len() == b.crashes.len() && a.signature_hash < b.signature_hash);
        if !ordered {
            anyhow::bail!(
                "Signature groups are out of order at {}",
                b.signature_hash
            );
        }
    }

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Fuzz Triage Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string            - Schema version (e.g., '1.0.0')");
        println!("  target: string             - Fuzz target name");
        println!("  run_dir: string            - Run directory");
        println!("  run_id: string             - Run identifier");
        println!("  generated_at: string       - ISO 8601 timestamp (UTC)");
        println!("  timeout_secs: number       - Per-crash timeout");
        println!("  meta: object?              - Run metadata (meta.json)");
        println!("  counts: object");
        println!("    total_crashes: number    - Crash inputs triaged");
        println!("    unique_signatures: number - Distinct signatures");
        println!("  signatures: array          - Groups, largest first");
        println!("    signature_hash: string   - SHA-256 of the top 12 frames");
        println!("    crashes: array           - Member file names");
        println!("  crashes: array             - Per-input records");
        println!("    crash_file: string       - Input file name");
        println!("    crash_path: string       - Input file path");
        println!("    status: string           - completed | timed_out | failed");
        println!("    exit_code: number?       - Exit code (negative = signal)");
        println!("    signature_hash: string   - Signature of this crash");
        println!("    stacktrace: array        - Normalized frames");
        println!("    log_path: string         - Raw reproduction log");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Fuzz Triage v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Crash reproduction and stack-trace deduplication for fuzzing runs.");
}
