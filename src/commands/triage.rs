//! Triage command implementation.
//!
//! The triage command:
//! 1. Resolves config, target and paths
//! 2. Reproduces every crash input of the run
//! 3. Groups crashes by signature
//! 4. Writes report.json and report.md

use super::models::{TriageArgs, TriageSummary};
use crate::aggregator::{load_meta, triage_batch, BatchConfig};
use crate::executor::RunStatus;
use crate::output::{write_markdown, write_report};
use crate::utils::config::{
    load_config, TriageConfig, CRASHES_DIR_NAME, REPORT_JSON_NAME, REPORT_MD_NAME,
};
use crate::utils::error::ConfigError;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::time::{Duration, Instant};

/// Upper bound for the per-crash timeout
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Execute the triage command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Configuration errors (unknown target, missing crashes dir or fuzzer)
/// * Report or log write failures, raised after everything that could be
///   written was written
pub fn execute_triage(args: TriageArgs) -> Result<TriageSummary> {
    let start_time = Instant::now();

    let config = resolve_config(&args)?;

    let run_dir = config.resolve(&args.run);
    let run_id = run_id_of(&run_dir)?;

    let fuzzer_path = match &args.fuzzer {
        Some(path) => config.resolve(path),
        None => config.fuzzer_path(&args.target)?,
    };

    let timeout_secs = args.timeout_secs.unwrap_or(config.default_timeout_secs);
    let report_dir = config.report_dir(&args.target, &run_id);

    info!("Target: {} ({})", args.target, fuzzer_path.display());
    info!("Run: {} ({})", run_id, run_dir.display());
    debug!("Report directory: {}", report_dir.display());

    let batch = BatchConfig {
        target: args.target.clone(),
        run_id,
        crashes_dir: run_dir.join(CRASHES_DIR_NAME),
        meta: load_meta(&run_dir)?,
        run_dir,
        fuzzer_path,
        timeout: Duration::from_secs(timeout_secs),
        log_dir: report_dir.clone(),
    };

    let outcome = triage_batch(&batch)?;

    // Write both reports before surfacing any failure
    let report_json = report_dir.join(REPORT_JSON_NAME);
    let report_md = report_dir.join(REPORT_MD_NAME);
    let json_result = write_report(&outcome.report, &report_json);
    let md_result = write_markdown(&outcome.report, &report_md);

    json_result.context("Failed to write JSON report")?;
    md_result.context("Failed to write Markdown report")?;
    let report = outcome.into_result()?;

    info!("✓ Reports written to: {}", report_dir.display());
    info!("Triage completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(TriageSummary {
        report_dir: report_dir.display().to_string(),
        report_md: report_md.display().to_string(),
        report_json: report_json.display().to_string(),
        total_crashes: report.counts.total_crashes,
        unique_signatures: report.counts.unique_signatures,
        timed_out: report
            .crashes
            .iter()
            .filter(|c| c.status == RunStatus::TimedOut)
            .count(),
    })
}

/// Load the config file (if any) and apply CLI overrides
///
/// **Private** - internal helper for execute_triage
fn resolve_config(args: &TriageArgs) -> Result<TriageConfig> {
    let mut config = match &args.config_path {
        Some(path) => load_config(path)?,
        None => TriageConfig::default(),
    };

    if let Some(root) = &args.workspace_root {
        config.workspace_root = root.clone();
    }
    if let Some(root) = &args.reports_root {
        config.reports_root = root.clone();
    }

    Ok(config)
}

/// Run identifier: the run directory's final component
fn run_id_of(run_dir: &Path) -> Result<String, ConfigError> {
    run_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ConfigError::Invalid(format!("Cannot derive a run id from {}", run_dir.display()))
        })
}

/// Validate triage arguments
///
/// **Public** - can be called before execute_triage for early validation
pub fn validate_args(args: &TriageArgs) -> Result<()> {
    if args.target.is_empty() {
        anyhow::bail!("Target cannot be empty");
    }

    // The target name becomes a directory under the reports root
    if !args
        .target
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        || args.target.starts_with('.')
    {
        anyhow::bail!("Target name contains invalid characters: {}", args.target);
    }

    if args.run.as_os_str().is_empty() {
        anyhow::bail!("Run directory cannot be empty");
    }

    if let Some(timeout) = args.timeout_secs {
        if timeout == 0 {
            anyhow::bail!("Timeout must be greater than 0");
        }
        if timeout > MAX_TIMEOUT_SECS {
            anyhow::bail!("Timeout is too large (max {}s)", MAX_TIMEOUT_SECS);
        }
    }

    Ok(())
}
