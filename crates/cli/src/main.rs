// taxsync CLI - reconcile APEX / COMMAND jurisdictions against rate edits

mod console;
mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use taxsync_recon::ReconError;
use tracing_subscriber::{fmt, EnvFilter};

use exit_codes::{recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "taxsync")]
#[command(about = "Find municipal tax jurisdictions whose rate changed and the platform that needs the update")]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG applies when not given.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the three sources and report required updates
    #[command(after_help = "\
Examples:
  taxsync run taxsync.toml
  taxsync run taxsync.toml --json --no-export
  taxsync run taxsync.toml --output-dir reports/2025-07 --quiet
  taxsync run taxsync.toml --fail-on-updates -v")]
    Run {
        /// Path to the TOML config file
        config: PathBuf,

        /// Print the full result as JSON to stdout instead of the console report
        #[arg(long)]
        json: bool,

        /// Write reports here instead of the config's output.dir
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Do not write Excel/CSV reports
        #[arg(long)]
        no_export: bool,

        /// Suppress the console report and stderr notes
        #[arg(long, short = 'q')]
        quiet: bool,

        /// Exit 7 when any jurisdiction requires an update
        #[arg(long)]
        fail_on_updates: bool,
    },

    /// Validate a config and check that its source files exist
    #[command(after_help = "\
Examples:
  taxsync validate taxsync.toml
  taxsync validate taxsync.toml --json")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,

        /// Print the source check as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Create error from an engine/IO error with its registry exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::SourceUnavailable { .. } => {
                Some("source paths are resolved relative to the config file's directory".to_string())
            }
            ReconError::MissingColumn { source, .. } => Some(format!(
                "map the header under [sources.{}.columns]",
                source.to_string().to_lowercase()
            )),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => Err(CliError::args("no command given").with_hint("taxsync --help for more information")),
        Some(Commands::Run { config, json, output_dir, no_export, quiet, fail_on_updates }) => {
            recon::cmd_run(
                config,
                recon::RunOptions { json, output_dir, no_export, quiet, fail_on_updates },
            )
        }
        Some(Commands::Validate { config, json }) => recon::cmd_validate(config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
