//! Human-readable run report for the terminal.

use std::fmt::Write;

use taxsync_recon::report::{top_states, ReportRow, REPORT_COLUMNS, TIMESTAMP_FORMAT};
use taxsync_recon::ReconResult;

const RULE_WIDTH: usize = 80;
const TOP_STATES: usize = 10;

pub fn render_report(result: &ReconResult, rows: &[ReportRow]) -> String {
    let s = &result.summary;
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "\n{heavy}");
    let _ = writeln!(out, "TAX JURISDICTION UPDATE REPORT: {}", result.meta.config_name);
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "\nGenerated: {}", result.meta.run_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "Total records processed: {}", s.total_records_processed);
    let _ = writeln!(out, "Records requiring update: {}", s.records_requiring_update);

    if !s.by_platform.is_empty() {
        let _ = writeln!(out, "\nBy platform:");
        for (platform, count) in &s.by_platform {
            let _ = writeln!(out, "  - {platform}: {count}");
        }
    }

    if !s.by_action.is_empty() {
        let _ = writeln!(out, "\nBy action:");
        for (action, count) in &s.by_action {
            let _ = writeln!(out, "  - {action}: {count}");
        }
    }

    let states = top_states(s, TOP_STATES);
    if !states.is_empty() {
        let _ = writeln!(out, "\nBy state (top {TOP_STATES}):");
        for (state, count) in states {
            let _ = writeln!(out, "  - {state}: {count}");
        }
    }

    if rows.is_empty() {
        let _ = writeln!(out, "\nNo updates required.");
    } else {
        let _ = writeln!(out, "\n{light}");
        let _ = writeln!(out, "UPDATE DETAIL");
        let _ = writeln!(out, "{light}");
        out.push_str(&render_table(rows));
    }

    let _ = writeln!(out, "\n{heavy}");
    out
}

/// Left-aligned columns, two spaces apart, widths from the widest cell.
fn render_table(rows: &[ReportRow]) -> String {
    let mut widths: Vec<usize> = REPORT_COLUMNS.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, value) in widths.iter_mut().zip(row.values()) {
            *w = (*w).max(value.chars().count());
        }
    }

    let line = |cells: [&str; 11]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(REPORT_COLUMNS);
    for row in rows {
        out.push_str(&line(row.values()));
    }
    out
}
