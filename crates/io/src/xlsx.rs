// Excel file import (xlsx, xls, xlsb, ods) and report export (xlsx only)
//
// Import: the first row of the chosen sheet becomes the header row, every
// following row a data row. Cell positions are absolute: when the used range
// does not start in column A, rows are padded so that positional sources
// still see column 0 as column A.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use taxsync_recon::report::{MetricValue, ReportRow, REPORT_COLUMNS};
use taxsync_recon::{Cell, Table};

pub const UPDATES_SHEET: &str = "Updates Required";
pub const SUMMARY_SHEET: &str = "Summary";

/// Read one sheet (the first when `sheet` is `None`) into a table.
pub fn import_table(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(format!(
                    "Sheet '{}' not found (available: {})",
                    name,
                    sheet_names.join(", ")
                ));
            }
            name.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        tracing::debug!(sheet = %sheet_name, "empty sheet");
        return Ok(Table::default());
    }

    // Range start offset (data may not begin at A1)
    let (_, data_start_col) = range.start().unwrap_or((0, 0));
    let pad = data_start_col as usize;

    let mut rows = range.rows().map(|row| {
        let mut cells = Vec::with_capacity(pad + row.len());
        cells.resize(pad, Cell::Empty);
        cells.extend(row.iter().map(convert_cell));
        cells
    });

    let headers = rows
        .next()
        .map(|cells| {
            cells
                .iter()
                .map(|c| c.display().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let rows: Vec<Vec<Cell>> = rows.collect();

    tracing::debug!(sheet = %sheet_name, rows = rows.len(), cols = pad + width, "sheet imported");
    Ok(Table::new(headers, rows))
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Store error as text representation
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => {
            // calamine does not expose the 1904 flag; assume the 1900 system
            match serial_to_date(dt.as_f64()) {
                Some(d) => Cell::Date(d),
                None => Cell::Number(dt.as_f64()),
            }
        }
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Excel serial day number (1900 date system) to a calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Write the update report: the detail sheet and the summary sheet.
pub fn export_report(
    path: &Path,
    rows: &[ReportRow],
    metrics: &[(String, MetricValue)],
) -> Result<(), String> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let updates = workbook
        .add_worksheet()
        .set_name(UPDATES_SHEET)
        .map_err(|e| format!("Failed to create sheet '{}': {}", UPDATES_SHEET, e))?;
    write_updates(updates, rows, &header)
        .map_err(|e| format!("Failed to write sheet '{}': {}", UPDATES_SHEET, e))?;

    let summary = workbook
        .add_worksheet()
        .set_name(SUMMARY_SHEET)
        .map_err(|e| format!("Failed to create sheet '{}': {}", SUMMARY_SHEET, e))?;
    write_summary(summary, metrics, &header)
        .map_err(|e| format!("Failed to write sheet '{}': {}", SUMMARY_SHEET, e))?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

fn write_updates(
    ws: &mut Worksheet,
    rows: &[ReportRow],
    header: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    if rows.is_empty() {
        ws.write_string_with_format(0, 0, "Message", header)?;
        ws.write_string(1, 0, "No updates required")?;
        return Ok(());
    }

    for (col, name) in REPORT_COLUMNS.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *name, header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.values().iter().enumerate() {
            if !value.is_empty() {
                ws.write_string(r, col as u16, *value)?;
            }
        }
    }
    ws.autofit();
    Ok(())
}

fn write_summary(
    ws: &mut Worksheet,
    metrics: &[(String, MetricValue)],
    header: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    ws.write_string_with_format(0, 0, "Metric", header)?;
    ws.write_string_with_format(0, 1, "Value", header)?;
    for (i, (metric, value)) in metrics.iter().enumerate() {
        let r = (i + 1) as u32;
        ws.write_string(r, 0, metric)?;
        match value {
            MetricValue::Count(n) => ws.write_number(r, 1, *n as f64)?,
            MetricValue::Text(s) => ws.write_string(r, 1, s)?,
        };
    }
    ws.autofit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_row(key: &str) -> ReportRow {
        ReportRow {
            city_state_key: key.into(),
            city: "GILBERT".into(),
            state: "AZ".into(),
            tax_code_apex: "GIL".into(),
            tax_code_command: String::new(),
            old_rate: "6.50%".into(),
            new_rate: "7.10%".into(),
            rate_change: "0.60%".into(),
            action_required: "Agregar a COMMAND".into(),
            effective_date: "2025-07-01".into(),
            update_platform: "ADD_TO_COMMAND".into(),
        }
    }

    fn read_sheet(path: &Path, name: &str) -> Table {
        import_table(path, Some(name)).unwrap()
    }

    #[test]
    fn test_serial_to_date() {
        assert_eq!(serial_to_date(45839.0), NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(serial_to_date(45306.75), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(serial_to_date(0.5), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_import_first_sheet_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("command.xlsx");

        let mut wb = Workbook::new();
        let ws = wb.add_worksheet().set_name("Report").unwrap();
        ws.write_string(0, 0, "Tax code").unwrap();
        ws.write_string(0, 1, "Description").unwrap();
        ws.write_number(1, 0, 4021.0).unwrap();
        ws.write_string(1, 1, "ADDISON, TX").unwrap();
        ws.write_number(2, 0, 0.0825).unwrap();
        wb.add_worksheet().set_name("Other").unwrap();
        wb.save(&path).unwrap();

        let table = import_table(&path, None).unwrap();
        assert_eq!(table.headers, vec!["Tax code", "Description"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), &Cell::Number(4021.0));
        assert_eq!(table.cell(0, 0).display().as_deref(), Some("4021"));
        assert_eq!(table.cell(0, 1).as_text(), Some("ADDISON, TX"));
        assert_eq!(table.cell(1, 0).as_f64(), Some(0.0825));
        assert_eq!(table.cell(1, 1), &Cell::Empty);
    }

    #[test]
    fn test_import_named_sheet_and_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multi.xlsx");

        let mut wb = Workbook::new();
        wb.add_worksheet().set_name("First").unwrap();
        let ws = wb.add_worksheet().set_name("Edits").unwrap();
        ws.write_string(0, 0, "State").unwrap();
        ws.write_string(1, 0, "Texas").unwrap();
        wb.save(&path).unwrap();

        let table = import_table(&path, Some("Edits")).unwrap();
        assert_eq!(table.headers, vec!["State"]);
        assert_eq!(table.cell(0, 0).as_text(), Some("Texas"));

        let err = import_table(&path, Some("Nope")).unwrap_err();
        assert!(err.contains("Nope"));
        assert!(err.contains("Edits"));
    }

    #[test]
    fn test_import_pads_offset_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");

        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 1, "Header").unwrap();
        ws.write_string(1, 1, "TaxCode").unwrap();
        ws.write_string(1, 2, "PLE").unwrap();
        wb.save(&path).unwrap();

        let table = import_table(&path, None).unwrap();
        assert_eq!(table.headers, vec!["", "Header", ""]);
        assert_eq!(table.cell(0, 0), &Cell::Empty);
        assert_eq!(table.cell(0, 1).as_text(), Some("TaxCode"));
        assert_eq!(table.cell(0, 2).as_text(), Some("PLE"));
    }

    #[test]
    fn test_import_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(import_table(&dir.path().join("nope.xlsx"), None).is_err());
    }

    #[test]
    fn test_export_report_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let metrics = vec![
            ("Total Records Processed".to_string(), MetricValue::Count(4)),
            (
                "Report Generated".to_string(),
                MetricValue::Text("2025-07-01 09:30:00".into()),
            ),
        ];

        export_report(&path, &[report_row("GILBERT_AZ")], &metrics).unwrap();

        let updates = read_sheet(&path, UPDATES_SHEET);
        assert_eq!(updates.headers, REPORT_COLUMNS.to_vec());
        assert_eq!(updates.row_count(), 1);
        assert_eq!(updates.cell(0, 0).as_text(), Some("GILBERT_AZ"));
        assert_eq!(updates.cell(0, 4), &Cell::Empty);
        assert_eq!(updates.cell(0, 8).as_text(), Some("Agregar a COMMAND"));

        let summary = read_sheet(&path, SUMMARY_SHEET);
        assert_eq!(summary.headers, vec!["Metric", "Value"]);
        assert_eq!(summary.cell(0, 0).as_text(), Some("Total Records Processed"));
        assert_eq!(summary.cell(0, 1).as_f64(), Some(4.0));
        assert_eq!(summary.cell(1, 1).as_text(), Some("2025-07-01 09:30:00"));
    }

    #[test]
    fn test_export_empty_report_has_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        export_report(&path, &[], &[]).unwrap();

        let updates = read_sheet(&path, UPDATES_SHEET);
        assert_eq!(updates.headers, vec!["Message"]);
        assert_eq!(updates.cell(0, 0).as_text(), Some("No updates required"));
        let summary = read_sheet(&path, SUMMARY_SHEET);
        assert_eq!(summary.row_count(), 0);
    }
}
