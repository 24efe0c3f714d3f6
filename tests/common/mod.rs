//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Fake fuzzer: prints the crash input as its own diagnostic output and
/// exits 1, or hangs when the input contains `HANG`.
pub const ECHO_FUZZER: &str = r#"#!/bin/sh
if grep -q HANG "$1"; then
  exec sleep 5
fi
cat "$1"
exit 1
"#;

#[cfg(unix)]
pub fn write_fuzzer(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake_fuzzer");
    fs::write(&path, ECHO_FUZZER).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// ASan-style report whose frames are `f<i>` for `i` in `0..frames`,
/// with addresses shifted by `seed` so runs differ only in addresses
pub fn asan_report(frames: usize, seed: u64) -> String {
    asan_report_with(&(0..frames).map(|i| format!("f{}", i)).collect::<Vec<_>>(), seed)
}

pub fn asan_report_with(functions: &[String], seed: u64) -> String {
    let mut out = String::from("INFO: Seed: 1234\n");
    out.push_str(&format!(
        "==4242==ERROR: AddressSanitizer: heap-buffer-overflow on address 0x{:x}\n",
        0x602000000000u64 + seed
    ));
    for (i, function) in functions.iter().enumerate() {
        out.push_str(&format!(
            "    #{} 0x{:x} in {} /src/cJSON.c:{}:5 (BuildId: {:x})\n",
            i,
            0x4f0000u64 + seed * 0x100 + i as u64,
            function,
            100 + i,
            seed
        ));
    }
    out.push_str("SUMMARY: AddressSanitizer: heap-buffer-overflow\n");
    out
}

/// `<root>/crashes/<name>` for each input
pub fn write_crashes(run_dir: &Path, inputs: &[(&str, String)]) {
    let crashes = run_dir.join("crashes");
    fs::create_dir_all(&crashes).unwrap();
    for (name, contents) in inputs {
        fs::write(crashes.join(name), contents).unwrap();
    }
}
