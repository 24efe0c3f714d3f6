//! Normalization of captured stack lines.
//!
//! Frames printed by sanitizers carry run-specific noise (ASLR addresses,
//! build ids, alignment padding). Removing it makes the same crash produce
//! the same text on every run and every machine.

use crate::utils::config::ADDR_PLACEHOLDER;
use regex::Regex;
use std::sync::LazyLock;

/// `#<n> <anything>`, optionally indented
pub(crate) static STACK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#[0-9]+\s+.*$").expect("valid stack line regex"));

static ADDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0x[0-9a-fA-F]+").expect("valid address regex"));

static BUILDID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(BuildId: [^)]+\)").expect("valid build id regex"));

static WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Whether a line has the shape of a stack frame
pub fn is_stack_line(line: &str) -> bool {
    STACK_LINE_RE.is_match(line)
}

/// Strip build ids and addresses, then canonicalize whitespace
///
/// **Public** - used by the extractor and by tests
///
/// Idempotent: the placeholder has no hex digit after `0x`, so a second
/// pass leaves it alone.
///
/// # Example
/// ```ignore
/// let line = "    #0 0x4f5e6a in cJSON_Parse /src/cJSON.c:1234:5 (BuildId: 1a2b)";
/// assert_eq!(
///     normalize_stack_line(line),
///     "#0 0x<ADDR> in cJSON_Parse /src/cJSON.c:1234:5"
/// );
/// ```
pub fn normalize_stack_line(line: &str) -> String {
    let line = BUILDID_RE.replace_all(line, "");
    let line = ADDR_RE.replace_all(&line, ADDR_PLACEHOLDER);
    WS_RE.replace_all(&line, " ").trim().to_string()
}
