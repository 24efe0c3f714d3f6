use fuzz_triage::aggregator::{count, group_by_signature, sha256_hex};
use fuzz_triage::commands::check_report_consistency;
use fuzz_triage::executor::RunStatus;
use fuzz_triage::output::{
    read_report, render_markdown, validate_path, write_markdown, write_report,
};
use fuzz_triage::parser::schema::{CrashRecord, TriageReport};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::NamedTempFile;

fn crash(name: &str, hash: &str, status: RunStatus, frames: &[&str]) -> CrashRecord {
    CrashRecord {
        crash_file: name.to_string(),
        crash_path: format!("/workspace/runs/r1/crashes/{}", name),
        status,
        exit_code: (status == RunStatus::Completed).then_some(1),
        signature_hash: hash.to_string(),
        stacktrace: frames.iter().map(|f| f.to_string()).collect(),
        log_path: format!("/workspace/artifacts/reports/cjson/r1/{}.repro.log", name),
    }
}

fn create_test_report() -> TriageReport {
    let h1 = sha256_hex("#0 0x<ADDR> in parse_value");
    let crashes = vec![
        crash("crash-1", &h1, RunStatus::Completed, &["#0 0x<ADDR> in parse_value"]),
        crash("crash-2", &sha256_hex("NO_STACKTRACE"), RunStatus::TimedOut, &[]),
        crash("crash-3", &h1, RunStatus::Completed, &["#0 0x<ADDR> in parse_value"]),
    ];
    let signatures = group_by_signature(&crashes);

    TriageReport {
        version: "1.0.0".to_string(),
        target: "cjson".to_string(),
        run_dir: "/workspace/runs/r1".to_string(),
        run_id: "r1".to_string(),
        generated_at: "2024-01-01T00:00:00+00:00".to_string(),
        timeout_secs: 20,
        meta: Some(serde_json::json!({"fuzzer": "libFuzzer", "max_len": 4096})),
        counts: count(&crashes, &signatures),
        signatures,
        crashes,
    }
}

#[test]
fn test_write_and_read_report_round_trip() {
    let report = create_test_report();
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    write_report(&report, path).unwrap();
    let loaded = read_report(path).unwrap();

    assert_eq!(loaded, report);
    assert_eq!(loaded.counts.total_crashes, 3);
    assert_eq!(loaded.counts.unique_signatures, 2);
    assert_eq!(loaded.signatures[0].crashes, vec!["crash-1", "crash-3"]);
    check_report_consistency(&loaded).unwrap();
}

#[test]
fn test_status_serialized_snake_case() {
    let report = create_test_report();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["crashes"][1]["status"], "timed_out");
    assert_eq!(json["crashes"][1]["exit_code"], serde_json::Value::Null);
    assert_eq!(json["counts"]["unique_signatures"], 2);
}

#[test]
fn test_report_without_meta_round_trips() {
    let mut report = create_test_report();
    report.meta = None;

    let temp_file = NamedTempFile::new().unwrap();
    write_report(&report, temp_file.path()).unwrap();
    assert_eq!(read_report(temp_file.path()).unwrap().meta, None);
}

#[test]
fn test_markdown_is_byte_identical_for_same_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = create_test_report();

    write_markdown(&report, dir.path().join("a.md")).unwrap();
    write_markdown(&report, dir.path().join("b.md")).unwrap();

    let a = std::fs::read(dir.path().join("a.md")).unwrap();
    let b = std::fs::read(dir.path().join("b.md")).unwrap();
    assert_eq!(a, b);
    assert_eq!(String::from_utf8(a).unwrap(), render_markdown(&report));
}

#[test]
fn test_markdown_sections() {
    let md = render_markdown(&create_test_report());

    assert!(md.starts_with("# Fuzz Triage Report - cjson\n"));
    assert!(md.contains("- **Total crashes:** **3**"));
    assert!(md.contains("- **Unique signatures:** **2**"));
    assert!(md.contains("## Meta\n```json\n"));
    assert!(md.contains("## Signatures (dedup)"));
    assert!(md.contains("- 2 crash(es)"));
    assert!(md.contains("## Crash details"));
    assert!(md.contains("### `crash-2`"));
    assert!(md.contains("_No stacktrace extracted._"));

    let signatures_at = md.find("## Signatures (dedup)").unwrap();
    let details_at = md.find("## Crash details").unwrap();
    assert!(signatures_at < details_at);
}

#[test]
fn test_inconsistent_report_rejected() {
    let mut report = create_test_report();
    report.counts.total_crashes = 4;
    assert!(check_report_consistency(&report).is_err());

    let mut report = create_test_report();
    report.signatures.reverse();
    assert!(check_report_consistency(&report).is_err());
}

#[test]
fn test_read_invalid_report() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "{\"version\": \"1.0.0\"}").unwrap();
    assert!(read_report(temp_file.path()).is_err());
}

#[test]
fn test_validate_output_path_empty() {
    assert!(validate_path(Path::new("")).is_err());
}

#[test]
fn test_write_creates_parent_dirs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested_path = temp_dir.path().join("nested/dirs/report.json");

    write_report(&create_test_report(), &nested_path).unwrap();

    assert!(nested_path.exists());
}
