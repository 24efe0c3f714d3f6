//! Fuzz Triage CLI
//!
//! Reproduces the crashes of a fuzzing run and writes a deduplicated
//! triage report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use std::path::PathBuf;

use fuzz_triage::commands::{
    display_schema, display_version, execute_triage, validate_args, validate_report_file,
    TriageArgs,
};
use fuzz_triage::utils::config::DEFAULT_TARGET;

/// Fuzz Triage - crash deduplication for fuzzing runs
#[derive(Parser, Debug)]
#[command(name = "fuzz-triage")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Triage the crashes of a fuzz run and generate reports
    Triage {
        /// Target name
        #[arg(short, long, default_value = DEFAULT_TARGET)]
        target: String,

        /// Run directory (absolute, or relative to the workspace root)
        #[arg(short, long)]
        run: PathBuf,

        /// Timeout in seconds per crash reproduction
        #[arg(long)]
        timeout: Option<u64>,

        /// TOML config file with workspace layout and targets
        #[arg(short, long, env = "FUZZ_TRIAGE_CONFIG")]
        config: Option<PathBuf>,

        /// Fuzzer binary to use instead of the registered one
        #[arg(long)]
        fuzzer: Option<PathBuf>,

        /// Root for relative run, fuzzer and report paths
        #[arg(long, env = "FUZZ_TRIAGE_WORKSPACE")]
        workspace_root: Option<PathBuf>,

        /// Reports are written to <reports-root>/<target>/<run id>
        #[arg(long)]
        reports_root: Option<PathBuf>,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli.command) {
        eprintln!("{} {}", "error:".red().bold(), one_line(&e));
        std::process::exit(1);
    }
}

/// Error chain on one line, skipping causes already quoted by their parent
fn one_line(err: &anyhow::Error) -> String {
    let mut line = String::new();
    for cause in err.chain() {
        let message = cause.to_string();
        if line.contains(&message) {
            continue;
        }
        if !line.is_empty() {
            line.push_str(": ");
        }
        line.push_str(&message);
    }
    line
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Triage {
            target,
            run,
            timeout,
            config,
            fuzzer,
            workspace_root,
            reports_root,
        } => {
            let args = TriageArgs {
                target,
                run,
                timeout_secs: timeout,
                config_path: config,
                fuzzer,
                workspace_root,
                reports_root,
            };

            // Validate args first
            validate_args(&args)?;

            let summary = execute_triage(args)?;

            println!("{}", "[+] Triage complete".green().bold());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
