// File I/O operations

pub mod csv;
pub mod sources;
pub mod xlsx;

use std::path::{Path, PathBuf};

use taxsync_recon::config::OutputConfig;
use taxsync_recon::report::{MetricValue, ReportRow};
use taxsync_recon::{ReconError, Table};

/// Read a table, picking the reader from the file extension.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => xlsx::import_table(path, sheet),
        "csv" | "txt" => csv::import_table(path, None),
        "tsv" => csv::import_table(path, Some(b'\t')),
        "" => Err("file has no extension".to_string()),
        other => Err(format!("unsupported file type '.{}'", other)),
    }
}

/// Report file stem: `{prefix}_{timestamp}`.
pub fn report_stem(prefix: &str, timestamp: &str) -> String {
    format!("{prefix}_{timestamp}")
}

/// Write the enabled report formats into `dir` (created if missing).
/// Returns the written paths, Excel first.
pub fn write_reports(
    dir: &Path,
    output: &OutputConfig,
    timestamp: &str,
    rows: &[ReportRow],
    metrics: &[(String, MetricValue)],
) -> Result<Vec<PathBuf>, ReconError> {
    let mut written = Vec::new();
    if !output.excel && !output.csv {
        return Ok(written);
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| ReconError::Write(format!("{}: {}", dir.display(), e)))?;
    let stem = report_stem(&output.filename_prefix, timestamp);

    if output.excel {
        let path = dir.join(format!("{stem}.xlsx"));
        xlsx::export_report(&path, rows, metrics)
            .map_err(|e| ReconError::Write(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "excel report written");
        written.push(path);
    }

    if output.csv {
        let path = dir.join(format!("{stem}.csv"));
        csv::export_report(&path, rows)
            .map_err(|e| ReconError::Write(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "csv report written");
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_table_dispatches_on_extension() {
        let dir = tempdir().unwrap();
        let tsv = dir.path().join("edits.TSV");
        fs::write(&tsv, "State\tNew Rate\nTexas\t0.0825\n").unwrap();
        let table = load_table(&tsv, None).unwrap();
        assert_eq!(table.headers, vec!["State", "New Rate"]);

        let pdf = dir.path().join("edits.pdf");
        fs::write(&pdf, "%PDF").unwrap();
        let err = load_table(&pdf, None).unwrap_err();
        assert!(err.contains(".pdf"));

        let bare = dir.path().join("edits");
        fs::write(&bare, "x").unwrap();
        assert!(load_table(&bare, None).is_err());
    }

    #[test]
    fn test_write_reports_honors_output_flags() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("output");

        let both = OutputConfig::default();
        let written = write_reports(&out, &both, "20250701_093000", &[], &[]).unwrap();
        assert_eq!(
            written,
            vec![
                out.join("tax_update_report_20250701_093000.xlsx"),
                out.join("tax_update_report_20250701_093000.csv"),
            ]
        );
        assert!(written.iter().all(|p| p.is_file()));

        let csv_only = OutputConfig {
            excel: false,
            filename_prefix: "sync".into(),
            ..OutputConfig::default()
        };
        let written = write_reports(&out, &csv_only, "x", &[], &[]).unwrap();
        assert_eq!(written, vec![out.join("sync_x.csv")]);

        let none = OutputConfig {
            excel: false,
            csv: false,
            ..OutputConfig::default()
        };
        let skipped = dir.path().join("never");
        assert!(write_reports(&skipped, &none, "x", &[], &[]).unwrap().is_empty());
        assert!(!skipped.exists());
    }
}
