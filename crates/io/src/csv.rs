// CSV/TSV import and report export

use std::io::Read;
use std::path::Path;

use taxsync_recon::report::{ReportRow, REPORT_COLUMNS};
use taxsync_recon::{Cell, Table};

/// Read a delimited file into a table. The delimiter is sniffed unless given.
pub fn import_table(path: &Path, delimiter: Option<u8>) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    import_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub(crate) fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Higher field count breaks ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut headers = Vec::new();
    let mut rows = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("line {}: {}", row_idx + 1, e))?;
        if row_idx == 0 {
            headers = record.iter().map(|h| h.to_string()).collect();
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Table::new(headers, rows))
}

/// Write the update report as CSV: header row plus one line per update.
pub fn export_report(path: &Path, rows: &[ReportRow]) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer.write_record(REPORT_COLUMNS).map_err(|e| e.to_string())?;
    for row in rows {
        writer.write_record(row.values()).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_quoted_locations() {
        // Commas inside quoted "CITY, ST" values must not win
        let content = "Tax code;Description;Short description\nPLE;\"PLEASANTON, TX\";Pleasanton\nGIL;\"GILBERT, AZ\";Gilbert\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_import_quoted_locations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("command.csv");
        fs::write(
            &path,
            "Tax code,Description,Short description\nPLE,\"PLEASANTON, TX\",Pleasanton\nGIL,\"GILBERT, AZ\",\n",
        )
        .unwrap();

        let table = import_table(&path, None).unwrap();
        assert_eq!(table.headers, vec!["Tax code", "Description", "Short description"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1).as_text(), Some("PLEASANTON, TX"));
        assert_eq!(table.cell(1, 2), &Cell::Empty);
    }

    #[test]
    fn test_import_windows_1252_and_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edits.csv");
        // "Cañon City" in Windows-1252
        let mut bytes = b"State,Jurisdiction Name\nColorado,Ca".to_vec();
        bytes.push(0xF1);
        bytes.extend_from_slice(b"on City\n");
        fs::write(&path, bytes).unwrap();

        let table = import_table(&path, None).unwrap();
        assert_eq!(table.cell(0, 1).as_text(), Some("Cañon City"));

        let bom = dir.path().join("bom.csv");
        fs::write(&bom, "\u{feff}State,Old Rate\nTexas,0.0825\n").unwrap();
        let table = import_table(&bom, None).unwrap();
        assert_eq!(table.column_index("State"), Some(0));
        assert_eq!(table.cell(0, 1).as_f64(), Some(0.0825));
    }

    #[test]
    fn test_import_ragged_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("apex.csv");
        fs::write(
            &path,
            "Tax Code Report,,\nTaxCode,PLE,\"PLEASANTON, TX\"\nTotal Rate,0.0825\n",
        )
        .unwrap();

        let table = import_table(&path, Some(b',')).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 2).as_text(), Some("PLEASANTON, TX"));
        assert_eq!(table.cell(1, 1).as_f64(), Some(0.0825));
        assert_eq!(table.cell(1, 2), &Cell::Empty);
    }

    #[test]
    fn test_export_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let row = ReportRow {
            city_state_key: "MESA_AZ".into(),
            city: "MESA".into(),
            state: "AZ".into(),
            tax_code_apex: "MES".into(),
            tax_code_command: "M1".into(),
            old_rate: "8.30%".into(),
            new_rate: "8.05%".into(),
            rate_change: "-0.25%".into(),
            action_required: "Decremento de tasa".into(),
            effective_date: "2025-07-01".into(),
            update_platform: "BOTH".into(),
        };

        export_report(&path, &[row]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(REPORT_COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("MESA_AZ,MESA,AZ,MES,M1,8.30%,8.05%,-0.25%,Decremento de tasa,2025-07-01,BOTH")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_empty_report_is_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        export_report(&path, &[]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
