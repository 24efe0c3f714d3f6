//! Batch triage: reproduce every crash input of a run and classify it.
//!
//! For each input, in file name order:
//! 1. Run the fuzzer with the input
//! 2. Write the raw output to `<log_dir>/<name>.repro.log`
//! 3. Extract the normalized stack trace
//! 4. Compute the signature
//!
//! A timeout or a lost child on one input degrades that input's record and
//! the batch moves on. A missing crash directory or an unusable fuzzer
//! aborts the batch.

use super::grouping::{count, group_by_signature};
use super::signature::Signature;
use crate::executor::{run_target, ExecutionRecord, RunStatus};
use crate::output::write_log;
use crate::parser::extract_stacktrace;
use crate::parser::schema::{CrashRecord, TriageReport};
use crate::utils::config::{META_FILE_NAME, REPRO_LOG_SUFFIX, SCHEMA_VERSION};
use crate::utils::error::{ConfigError, ExecError, OutputError, TriageError};
use chrono::Utc;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Everything a batch run needs, with all paths already resolved
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub target: String,
    pub run_id: String,
    pub run_dir: PathBuf,

    /// Directory holding the crash inputs
    pub crashes_dir: PathBuf,

    /// Fuzzer binary, invoked as `fuzzer <input>`
    pub fuzzer_path: PathBuf,

    /// Per-input execution timeout
    pub timeout: Duration,

    /// Where `.repro.log` files are written
    pub log_dir: PathBuf,

    pub meta: Option<serde_json::Value>,
}

/// One crash input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashInput {
    pub name: String,
    pub path: PathBuf,
}

/// A finished batch: the report plus any log files that failed to write
#[derive(Debug)]
pub struct BatchOutcome {
    pub report: TriageReport,
    pub log_write_errors: Vec<(PathBuf, OutputError)>,
}

impl BatchOutcome {
    /// The report, or the first log write failure
    pub fn into_result(self) -> Result<TriageReport, TriageError> {
        match self.log_write_errors.into_iter().next() {
            Some((path, source)) => Err(TriageError::Artifact { path, source }),
            None => Ok(self.report),
        }
    }
}

/// Triage every crash input of a run
///
/// **Public** - main entry point of the aggregator
///
/// # Errors
/// * `ConfigError::CrashesDirMissing` - crashes directory does not exist
/// * `ConfigError::FuzzerMissing` - fuzzer binary does not exist
/// * `ConfigError::FuzzerNotExecutable` - fuzzer lacks the exec bit
/// * `ConfigError::FuzzerSpawn` - fuzzer exists but cannot be started
/// * `TriageError::ListInputs` - crashes directory cannot be read
/// * `TriageError::Artifact` - log directory cannot be created
pub fn triage_batch(config: &BatchConfig) -> Result<BatchOutcome, TriageError> {
    check_paths(config)?;

    let inputs = list_crash_inputs(&config.crashes_dir)?;
    info!(
        "Triaging {} crash inputs for {} (run {})",
        inputs.len(),
        config.target,
        config.run_id
    );

    fs::create_dir_all(&config.log_dir).map_err(|e| TriageError::Artifact {
        path: config.log_dir.clone(),
        source: OutputError::WriteFailed(e),
    })?;

    let start_time = Instant::now();
    let mut records = Vec::with_capacity(inputs.len());
    let mut log_write_errors = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        info!("[{}/{}] {}", index + 1, inputs.len(), input.name);

        let log_path = log_path_for(&config.log_dir, &input.name);
        let (record, output) = triage_input(config, input, &log_path)?;

        if let Err(e) = write_log(&log_path, &output) {
            warn!("Failed to write {}: {}", log_path.display(), e);
            log_write_errors.push((log_path, e));
        }

        records.push(record);
    }

    let signatures = group_by_signature(&records);
    let counts = count(&records, &signatures);

    info!(
        "Triage finished in {:.2}s: {} crashes, {} unique signatures",
        start_time.elapsed().as_secs_f64(),
        counts.total_crashes,
        counts.unique_signatures
    );

    let report = TriageReport {
        version: SCHEMA_VERSION.to_string(),
        target: config.target.clone(),
        run_dir: config.run_dir.display().to_string(),
        run_id: config.run_id.clone(),
        generated_at: Utc::now().to_rfc3339(),
        timeout_secs: config.timeout.as_secs(),
        meta: config.meta.clone(),
        counts,
        signatures,
        crashes: records,
    };

    Ok(BatchOutcome {
        report,
        log_write_errors,
    })
}

/// Reproduce and classify one input. Returns the record and the raw
/// output destined for the log file.
///
/// **Private** - per-input boundary
///
/// # Errors
/// * `ConfigError::FuzzerSpawn` - the fuzzer cannot be started at all
fn triage_input(
    config: &BatchConfig,
    input: &CrashInput,
    log_path: &Path,
) -> Result<(CrashRecord, String), ConfigError> {
    let execution = run_target(&config.fuzzer_path, &input.path, config.timeout);
    classify(input, log_path, execution)
}

/// Turn one execution result into a crash record
///
/// Timeouts and wait/capture failures degrade the record. A spawn failure
/// would fail every input the same way, so it aborts the batch.
fn classify(
    input: &CrashInput,
    log_path: &Path,
    execution: Result<ExecutionRecord, ExecError>,
) -> Result<(CrashRecord, String), ConfigError> {
    let (status, exit_code, output) = match execution {
        Ok(record) => {
            debug!(
                "{} ran in {:.2}s of {}s",
                input.name,
                record.elapsed.as_secs_f64(),
                record.timeout.as_secs()
            );
            (RunStatus::Completed, Some(record.exit_code), record.output)
        }
        Err(ExecError::Timeout { timeout, output }) => {
            warn!("{} timed out after {}s", input.name, timeout.as_secs_f64());
            (RunStatus::TimedOut, None, output)
        }
        Err(ExecError::Spawn { path, source }) => {
            return Err(ConfigError::FuzzerSpawn { path, source });
        }
        Err(e) => {
            warn!("{} could not be reproduced: {}", input.name, e);
            (RunStatus::Failed, None, format!("{}\n", e))
        }
    };

    let (stacktrace, signature) = match status {
        RunStatus::Completed => {
            let stacktrace = extract_stacktrace(&output);
            let signature = Signature::from_stacktrace(&stacktrace);
            (stacktrace, signature)
        }
        RunStatus::TimedOut | RunStatus::Failed => (Vec::new(), Signature::sentinel()),
    };

    debug!(
        "{}: exit {:?}, {} frames, signature {}",
        input.name,
        exit_code,
        stacktrace.len(),
        signature.short_hash()
    );

    let record = CrashRecord {
        crash_file: input.name.clone(),
        crash_path: input.path.display().to_string(),
        status,
        exit_code,
        signature_hash: signature.hash,
        stacktrace,
        log_path: log_path.display().to_string(),
    };

    Ok((record, output))
}

/// Fail fast on configuration problems
///
/// **Private** - internal validation
fn check_paths(config: &BatchConfig) -> Result<(), ConfigError> {
    if !config.crashes_dir.is_dir() {
        return Err(ConfigError::CrashesDirMissing(config.crashes_dir.clone()));
    }

    if !config.fuzzer_path.is_file() {
        return Err(ConfigError::FuzzerMissing(config.fuzzer_path.clone()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&config.fuzzer_path)
            .map_err(|source| ConfigError::ReadFailed {
                path: config.fuzzer_path.clone(),
                source,
            })?
            .permissions()
            .mode();
        if mode & 0o111 == 0 {
            return Err(ConfigError::FuzzerNotExecutable(config.fuzzer_path.clone()));
        }
    }

    if config.timeout.is_zero() {
        return Err(ConfigError::Invalid("timeout must be greater than 0".to_string()));
    }

    Ok(())
}

/// Regular files of a directory, sorted by name
///
/// **Public** - exposed for the CLI and tests
pub fn list_crash_inputs(dir: &Path) -> Result<Vec<CrashInput>, TriageError> {
    let list_err = |source| TriageError::ListInputs {
        dir: dir.to_path_buf(),
        source,
    };

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if !path.is_file() {
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        inputs.push(CrashInput { name, path });
    }

    inputs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(inputs)
}

/// Log file for a crash input: `<log_dir>/<name>.repro.log`
pub fn log_path_for(log_dir: &Path, crash_name: &str) -> PathBuf {
    log_dir.join(format!("{}{}", crash_name, REPRO_LOG_SUFFIX))
}

/// Read the optional `meta.json` of a run directory
///
/// # Errors
/// * `ConfigError::ReadFailed` - file exists but cannot be read
/// * `ConfigError::InvalidMeta` - file is not valid JSON
pub fn load_meta(run_dir: &Path) -> Result<Option<serde_json::Value>, ConfigError> {
    let meta_file = run_dir.join(META_FILE_NAME);
    if !meta_file.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&meta_file).map_err(|source| ConfigError::ReadFailed {
        path: meta_file.clone(),
        source,
    })?;

    let meta: serde_json::Value = serde_json::from_str(&contents).map_err(|source| {
        ConfigError::InvalidMeta {
            path: meta_file.clone(),
            source,
        }
    })?;

    debug!("Loaded run metadata from {}", meta_file.display());

    Ok(match meta {
        serde_json::Value::Null => None,
        other => Some(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_crash_inputs_sorted_and_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("crash-b"), b"b").unwrap();
        fs::write(dir.path().join("crash-a"), b"a").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let inputs = list_crash_inputs(dir.path()).unwrap();
        let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["crash-a", "crash-b"]);
    }

    #[test]
    fn test_log_path_for() {
        assert_eq!(
            log_path_for(Path::new("/reports/cjson/r1"), "crash-1"),
            PathBuf::from("/reports/cjson/r1/crash-1.repro.log")
        );
    }

    #[test]
    fn test_load_meta_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_meta(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_load_meta_invalid_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(META_FILE_NAME), "{ not json").unwrap();
        assert!(matches!(
            load_meta(dir.path()),
            Err(ConfigError::InvalidMeta { .. })
        ));
    }

    fn crash_input(dir: &Path) -> CrashInput {
        CrashInput {
            name: "crash-1".to_string(),
            path: dir.join("crash-1"),
        }
    }

    #[test]
    fn test_wait_failure_degrades_to_failed_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = crash_input(dir.path());
        let log_path = log_path_for(dir.path(), &input.name);
        let lost = ExecError::Wait(std::io::Error::other("child vanished"));

        let (record, output) = classify(&input, &log_path, Err(lost)).unwrap();

        assert_eq!(record.status, RunStatus::Failed);
        assert_eq!(record.exit_code, None);
        assert!(record.stacktrace.is_empty());
        assert_eq!(record.signature_hash, Signature::sentinel().hash);
        assert!(output.contains("child vanished"));
    }

    #[test]
    fn test_timeout_degrades_to_timed_out_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = crash_input(dir.path());
        let log_path = log_path_for(dir.path(), &input.name);
        let timeout = ExecError::Timeout {
            timeout: Duration::from_secs(1),
            output: "    #0 0x1 in hang\n".to_string(),
        };

        let (record, output) = classify(&input, &log_path, Err(timeout)).unwrap();

        assert_eq!(record.status, RunStatus::TimedOut);
        assert!(record.stacktrace.is_empty());
        assert_eq!(record.signature_hash, Signature::sentinel().hash);
        assert_eq!(output, "    #0 0x1 in hang\n");
    }

    #[test]
    fn test_spawn_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = crash_input(dir.path());
        let log_path = log_path_for(dir.path(), &input.name);
        let spawn = ExecError::Spawn {
            path: dir.path().join("fuzzer"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        let err = classify(&input, &log_path, Err(spawn)).unwrap_err();
        assert!(matches!(err, ConfigError::FuzzerSpawn { .. }));
    }

    #[test]
    fn test_missing_crashes_dir_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig {
            target: "cjson".to_string(),
            run_id: "r1".to_string(),
            run_dir: dir.path().to_path_buf(),
            crashes_dir: dir.path().join("crashes"),
            fuzzer_path: dir.path().join("fuzzer"),
            timeout: Duration::from_secs(1),
            log_dir: dir.path().join("reports"),
            meta: None,
        };

        let err = triage_batch(&config).unwrap_err();
        assert!(matches!(
            err,
            TriageError::Config(ConfigError::CrashesDirMissing(_))
        ));
        assert!(!config.log_dir.exists());
    }
}
