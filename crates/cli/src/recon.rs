//! `taxsync run` / `taxsync validate`: config-driven jurisdiction reconciliation.

use std::path::{Path, PathBuf};

use taxsync_io::sources::{check_sources, load_sources, resolve_sources, SourceFile};
use taxsync_recon::report::{format_update_report, summary_metrics};
use taxsync_recon::ReconConfig;

use crate::console::render_report;
use crate::exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_SOURCE_UNAVAILABLE, EXIT_UPDATES_FOUND};
use crate::CliError;

/// Report file names carry the run time at second resolution.
const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct RunOptions {
    pub json: bool,
    pub output_dir: Option<PathBuf>,
    pub no_export: bool,
    pub quiet: bool,
    pub fail_on_updates: bool,
}

fn config_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
}

/// Read and validate the config. Returns it with the directory relative paths resolve against.
fn load_config(config_path: &Path) -> Result<(ReconConfig, PathBuf), CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| config_err(format!("cannot read config {}: {e}", config_path.display())))?;
    let config = ReconConfig::from_toml(&config_str).map_err(CliError::recon)?;
    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    tracing::info!(config = %config_path.display(), name = %config.name, "config loaded");
    Ok((config, base_dir))
}

pub fn cmd_run(config_path: PathBuf, opts: RunOptions) -> Result<(), CliError> {
    let (config, base_dir) = load_config(&config_path)?;

    let input = load_sources(&config, &base_dir).map_err(CliError::recon)?;
    let result = taxsync_recon::run(&config, &input).map_err(CliError::recon)?;
    let rows = format_update_report(&result.updates);

    if opts.json {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json_str}");
    } else if config.output.console && !opts.quiet {
        print!("{}", render_report(&result, &rows));
    }

    if !opts.no_export {
        let dir = opts
            .output_dir
            .clone()
            .unwrap_or_else(|| base_dir.join(&config.output.dir));
        let stamp = result.meta.run_at.format(FILE_STAMP_FORMAT).to_string();
        let metrics = summary_metrics(&result.summary, &result.meta);
        let written = taxsync_io::write_reports(&dir, &config.output, &stamp, &rows, &metrics)
            .map_err(CliError::recon)?;
        if !opts.quiet {
            for path in &written {
                eprintln!("wrote {}", path.display());
            }
        }
    }

    let s = &result.summary;
    if !opts.quiet {
        eprintln!(
            "{} records joined, {} require update",
            s.total_records_processed, s.records_requiring_update
        );
    }

    if opts.fail_on_updates && s.records_requiring_update > 0 {
        return Err(CliError {
            code: EXIT_UPDATES_FOUND,
            message: format!("{} jurisdictions require update", s.records_requiring_update),
            hint: None,
        });
    }

    Ok(())
}

fn file_size(source: &SourceFile) -> Option<u64> {
    std::fs::metadata(&source.path).ok().map(|m| m.len())
}

pub fn cmd_validate(config_path: PathBuf, json: bool) -> Result<(), CliError> {
    let (config, base_dir) = load_config(&config_path)?;
    let sources = resolve_sources(&config, &base_dir);

    if json {
        let entries: Vec<serde_json::Value> = sources
            .iter()
            .map(|s| {
                serde_json::json!({
                    "source": s.kind,
                    "path": s.path.display().to_string(),
                    "sheet": s.sheet,
                    "exists": s.exists(),
                    "size_bytes": file_size(s),
                })
            })
            .collect();
        let doc = serde_json::json!({
            "config": config_path.display().to_string(),
            "name": config.name,
            "sources": entries,
        });
        println!("{doc:#}");
    } else {
        println!("{}: config OK ({})", config_path.display(), config.name);
        for s in &sources {
            match file_size(s).filter(|_| s.exists()) {
                Some(size) => println!("  ok      {}: {} ({size} bytes)", s.kind, s.path.display()),
                None => println!("  missing {}: {}", s.kind, s.path.display()),
            }
        }
    }

    check_sources(&sources).map_err(|e| {
        let missing = sources.iter().filter(|s| !s.exists()).count();
        CliError {
            code: EXIT_SOURCE_UNAVAILABLE,
            message: format!("{missing} of {} source files missing ({e})", sources.len()),
            hint: Some("source paths are resolved relative to the config file's directory".into()),
        }
    })
}
