use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the triage command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct TriageArgs {
    /// Target name, looked up in the target registry
    pub target: String,

    /// Run directory (absolute, or relative to the workspace root)
    pub run: PathBuf,

    /// Per-crash timeout; config default when `None`
    pub timeout_secs: Option<u64>,

    /// Optional TOML config file
    pub config_path: Option<PathBuf>,

    /// Fuzzer binary override, bypasses the target registry
    pub fuzzer: Option<PathBuf>,

    /// Workspace root override
    pub workspace_root: Option<PathBuf>,

    /// Reports root override
    pub reports_root: Option<PathBuf>,
}

impl Default for TriageArgs {
    fn default() -> Self {
        Self {
            target: "cjson".to_string(),
            run: PathBuf::new(),
            timeout_secs: None,
            config_path: None,
            fuzzer: None,
            workspace_root: None,
            reports_root: None,
        }
    }
}

/// What a finished triage run prints
#[derive(Debug, Clone, Serialize)]
pub struct TriageSummary {
    pub report_dir: String,
    pub report_md: String,
    pub report_json: String,
    pub total_crashes: usize,
    pub unique_signatures: usize,
    pub timed_out: usize,
}
