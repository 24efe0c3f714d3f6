//! Configuration and constants for the CLI.
//!
//! Settings come from three layers, lowest priority first: built-in
//! defaults, an optional TOML file, then command-line flags.

use super::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default timeout for a single crash reproduction
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default target when none is given
pub const DEFAULT_TARGET: &str = "cjson";

// Substrings that open a sanitizer/libFuzzer fault report
pub const START_MARKERS: &[&str] = &[
    "ERROR: libFuzzer:",
    "AddressSanitizer",
    "UndefinedBehaviorSanitizer",
    "MemorySanitizer",
    "ThreadSanitizer",
    "LeakSanitizer",
];

/// Lines starting with this end the fault report
pub const SUMMARY_MARKER: &str = "SUMMARY:";

/// Frames kept for the signature
pub const SIGNATURE_FRAMES: usize = 12;

/// Frames collected by the marker-less fallback scan
pub const FALLBACK_MAX_FRAMES: usize = 30;

/// Trace lines shown per crash in the Markdown report
pub const REPORT_MAX_FRAMES: usize = 30;

/// Signature text for inputs with no usable trace
pub const NO_STACKTRACE: &str = "NO_STACKTRACE";

/// Replacement for hexadecimal address tokens
pub const ADDR_PLACEHOLDER: &str = "0x<ADDR>";

pub const CRASHES_DIR_NAME: &str = "crashes";
pub const META_FILE_NAME: &str = "meta.json";
pub const REPORT_JSON_NAME: &str = "report.json";
pub const REPORT_MD_NAME: &str = "report.md";
pub const REPRO_LOG_SUFFIX: &str = ".repro.log";

/// A fuzz target known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Fuzzer binary, relative paths resolve against the workspace root
    pub fuzzer: PathBuf,
}

/// Triage settings, loadable from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Root that relative run, fuzzer and report paths resolve against
    pub workspace_root: PathBuf,

    /// Reports land in `<reports_root>/<target>/<run_id>`
    pub reports_root: PathBuf,

    pub default_timeout_secs: u64,

    pub targets: BTreeMap<String, TargetConfig>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        let mut targets = BTreeMap::new();
        targets.insert(
            DEFAULT_TARGET.to_string(),
            TargetConfig {
                fuzzer: PathBuf::from("targets/cjson/out/cjson_fuzzer"),
            },
        );

        Self {
            workspace_root: PathBuf::from("."),
            reports_root: PathBuf::from("artifacts/reports"),
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            targets,
        }
    }
}

impl TriageConfig {
    /// Parse a config document. Missing keys keep their defaults, and
    /// targets listed in the document are added to the built-in ones.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: TriageConfig = toml::from_str(contents)?;

        for (name, target) in TriageConfig::default().targets {
            config.targets.entry(name).or_insert(target);
        }

        if config.default_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "default_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(config)
    }

    /// Resolve a path against the workspace root unless it is absolute
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    /// Absolute-or-workspace-relative fuzzer path for a target
    pub fn fuzzer_path(&self, target: &str) -> Result<PathBuf, ConfigError> {
        self.targets
            .get(target)
            .map(|t| self.resolve(&t.fuzzer))
            .ok_or_else(|| ConfigError::UnknownTarget(target.to_string()))
    }

    /// Report directory for one run of one target
    pub fn report_dir(&self, target: &str, run_id: &str) -> PathBuf {
        self.resolve(&self.reports_root).join(target).join(run_id)
    }
}

/// Load triage settings from a TOML file
///
/// # Errors
/// * `ConfigError::ReadFailed` - If the file cannot be read
/// * `ConfigError::ParseFailed` - If the TOML is invalid
pub fn load_config(path: impl AsRef<Path>) -> Result<TriageConfig, ConfigError> {
    let path = path.as_ref();
    debug!("Loading config from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    TriageConfig::from_toml_str(&contents)
}
