//! Stack trace extraction from raw sanitizer / libFuzzer output.
//!
//! The output of a crashing fuzzer is noisy: banner lines, libFuzzer stats,
//! allocation traces and a closing `SUMMARY:` line. We want the frames of
//! the fault report only, in the order they were printed.

use super::normalize::{is_stack_line, normalize_stack_line};
use crate::utils::config::{FALLBACK_MAX_FRAMES, START_MARKERS, SUMMARY_MARKER};
use log::debug;

/// Scanner state for the primary pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// No fault report seen yet
    Scanning,
    /// Inside a fault report; stays here until `SUMMARY:`
    InTrace,
}

/// Extract the normalized stack trace from raw target output
///
/// **Public** - main entry point for trace extraction
///
/// # Algorithm
/// 1. Scan lines until one contains a start marker (`ERROR: libFuzzer:`,
///    `AddressSanitizer`, ...), then switch to `InTrace` for good
/// 2. In `InTrace`, keep every `#<n> ...` line after normalization
/// 3. A line starting with `SUMMARY:` ends the scan
/// 4. If nothing was kept, fall back to the first 30 frame-shaped lines
///    anywhere in the output
///
/// Returns an empty vector when the output has no frame-shaped lines.
pub fn extract_stacktrace(output: &str) -> Vec<String> {
    let stack = scan_fault_report(output);
    if !stack.is_empty() {
        return stack;
    }

    let fallback: Vec<String> = output
        .lines()
        .filter(|line| is_stack_line(line))
        .take(FALLBACK_MAX_FRAMES)
        .map(normalize_stack_line)
        .collect();

    if !fallback.is_empty() {
        debug!("No fault report found, fallback kept {} frames", fallback.len());
    }

    fallback
}

/// Primary pass over the fault report section
///
/// **Private** - internal helper for extract_stacktrace
fn scan_fault_report(output: &str) -> Vec<String> {
    let mut state = ScanState::Scanning;
    let mut stack = Vec::new();

    for line in output.lines() {
        if state == ScanState::Scanning && is_start_marker(line) {
            state = ScanState::InTrace;
        }

        if state == ScanState::InTrace {
            if is_stack_line(line) {
                stack.push(normalize_stack_line(line));
            }
            if line.starts_with(SUMMARY_MARKER) {
                break;
            }
        }
    }

    stack
}

fn is_start_marker(line: &str) -> bool {
    START_MARKERS.iter().any(|marker| line.contains(marker))
}
