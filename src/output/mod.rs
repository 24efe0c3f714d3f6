//! Output writers for triage artifacts.
//!
//! This module handles writing data to disk in various formats:
//! - JSON reports (machine-readable, round-trippable)
//! - Markdown reports (human-readable)
//! - Raw reproduction logs

pub mod json;
pub mod markdown;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use markdown::{render_markdown, write_markdown};

use crate::utils::error::OutputError;
use log::debug;
use std::io::Write;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Write `contents` to `path` through a temp file in the same directory,
/// renamed into place once fully written. Readers never see a half-written
/// file, and an interrupted run leaves the previous file (or none).
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    validate_path(path)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !parent.exists() {
        debug!("Creating parent directories: {}", parent.display());
        std::fs::create_dir_all(parent).map_err(|e| {
            OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
        })?;
    }

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| OutputError::WriteFailed(e.error))?;

    Ok(())
}

/// Write the raw captured output of one reproduction
pub fn write_log(path: &Path, output: &str) -> Result<(), OutputError> {
    write_atomic(path, output.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_output_path_empty() {
        assert!(validate_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_atomic_creates_parents_and_replaces() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/dirs/crash-1.repro.log");

        write_log(&path, "first").unwrap();
        write_log(&path, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        // no temp files left behind
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
