//! Markdown rendering of triage reports.
//!
//! The rendering is a pure function of the report, so the same report
//! always produces the same bytes.

use super::write_atomic;
use crate::aggregator::short_hash;
use crate::parser::schema::{CrashRecord, SignatureGroup, TriageReport};
use crate::utils::config::REPORT_MAX_FRAMES;
use crate::utils::error::OutputError;
use log::info;
use std::path::Path;

/// Render a human-readable report
pub fn render_markdown(report: &TriageReport) -> String {
    let mut out = String::new();

    out.push_str(&render_header(report));
    out.push_str(&render_meta(report));
    out.push_str(&render_signatures(&report.signatures));
    out.push_str(&render_crash_details(&report.crashes));

    out
}

/// Render and write the Markdown report
pub fn write_markdown(
    report: &TriageReport,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing Markdown report to: {}", output_path.display());
    write_atomic(output_path, render_markdown(report).as_bytes())
}

fn render_header(report: &TriageReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Fuzz Triage Report - {}\n\n", report.target));
    out.push_str(&format!("- **Run ID:** `{}`\n", report.run_id));
    out.push_str(&format!("- **Run dir:** `{}`\n", report.run_dir));
    out.push_str(&format!("- **Generated:** `{}`\n", report.generated_at));
    out.push_str(&format!("- **Timeout:** `{}s`\n", report.timeout_secs));
    out.push_str(&format!("- **Total crashes:** **{}**\n", report.counts.total_crashes));
    out.push_str(&format!(
        "- **Unique signatures:** **{}**\n\n",
        report.counts.unique_signatures
    ));
    out
}

fn render_meta(report: &TriageReport) -> String {
    let meta = match &report.meta {
        Some(serde_json::Value::Object(map)) if map.is_empty() => return String::new(),
        Some(meta) => meta,
        None => return String::new(),
    };

    // Value -> string cannot fail
    let pretty = serde_json::to_string_pretty(meta).unwrap_or_else(|_| meta.to_string());

    format!("## Meta\n```json\n{}\n```\n\n", pretty)
}

fn render_signatures(groups: &[SignatureGroup]) -> String {
    let mut out = String::from("## Signatures (dedup)\n");

    for group in groups {
        out.push_str(&format!(
            "### `{}` - {} crash(es)\n\n",
            short_hash(&group.signature_hash),
            group.crashes.len()
        ));
        for name in &group.crashes {
            out.push_str(&format!("- `{}`\n", name));
        }
        out.push('\n');
    }

    out
}

fn render_crash_details(records: &[CrashRecord]) -> String {
    let mut out = String::from("## Crash details\n");

    for record in records {
        out.push_str(&format!("### `{}`\n\n", record.crash_file));
        out.push_str(&format!("- **Signature:** `{}`\n", record.signature_hash));
        out.push_str(&format!("- **Status:** `{}`", record.status));
        if let Some(code) = record.exit_code {
            out.push_str(&format!(" (exit code {})", code));
        }
        out.push('\n');
        out.push_str(&format!("- **Repro log:** `{}`\n\n", record.log_path));

        if record.stacktrace.is_empty() {
            out.push_str("_No stacktrace extracted._\n");
        } else {
            out.push_str("```\n");
            for frame in record.stacktrace.iter().take(REPORT_MAX_FRAMES) {
                out.push_str(frame);
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out.push('\n');
    }

    out
}
