//! Report rows for export and display. Pure formatting, no I/O.

use serde::Serialize;

use crate::model::{ReconMeta, ReconSummary, UpdateRecord};

/// Export column order.
pub const REPORT_COLUMNS: [&str; 11] = [
    "city_state_key",
    "city",
    "state",
    "tax_code_apex",
    "tax_code_command",
    "old_rate",
    "new_rate",
    "rate_change",
    "action_required",
    "effective_date",
    "update_platform",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One update, rendered. Absent values are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub city_state_key: String,
    pub city: String,
    pub state: String,
    pub tax_code_apex: String,
    pub tax_code_command: String,
    pub old_rate: String,
    pub new_rate: String,
    pub rate_change: String,
    pub action_required: String,
    pub effective_date: String,
    pub update_platform: String,
}

impl ReportRow {
    /// Values in [`REPORT_COLUMNS`] order.
    pub fn values(&self) -> [&str; 11] {
        [
            self.city_state_key.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.tax_code_apex.as_str(),
            self.tax_code_command.as_str(),
            self.old_rate.as_str(),
            self.new_rate.as_str(),
            self.rate_change.as_str(),
            self.action_required.as_str(),
            self.effective_date.as_str(),
            self.update_platform.as_str(),
        ]
    }
}

/// Fractional rate as a percentage with two decimals: `0.0825` → `"8.25%"`.
pub fn format_rate(rate: f64) -> String {
    if rate.is_finite() {
        format!("{:.2}%", rate * 100.0)
    } else {
        "N/A".into()
    }
}

/// Render updates for export, sorted by state then city.
pub fn format_update_report(updates: &[UpdateRecord]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = updates
        .iter()
        .map(|u| {
            let p = &u.joined.platforms;
            ReportRow {
                city_state_key: p.city_state_key.clone(),
                city: p.city.clone(),
                state: p.state.clone(),
                tax_code_apex: p.tax_code_apex.clone().unwrap_or_default(),
                tax_code_command: p.tax_code_command.clone().unwrap_or_default(),
                old_rate: format_rate(u.joined.old_rate),
                new_rate: format_rate(u.joined.new_rate),
                rate_change: format_rate(u.joined.rate_change),
                action_required: u.action_required.to_string(),
                effective_date: u.joined.effective_date.clone().unwrap_or_default(),
                update_platform: p.update_platform.to_string(),
            }
        })
        .collect();

    rows.sort_by(|a, b| (&a.state, &a.city).cmp(&(&b.state, &b.city)));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValue {
    Count(usize),
    Text(String),
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Metric/value rows for the summary sheet.
pub fn summary_metrics(summary: &ReconSummary, meta: &ReconMeta) -> Vec<(String, MetricValue)> {
    let mut rows = vec![
        (
            "Total Records Processed".to_string(),
            MetricValue::Count(summary.total_records_processed),
        ),
        (
            "Records Requiring Update".to_string(),
            MetricValue::Count(summary.records_requiring_update),
        ),
        (
            "Report Generated".to_string(),
            MetricValue::Text(meta.run_at.format(TIMESTAMP_FORMAT).to_string()),
        ),
    ];
    for (platform, count) in &summary.by_platform {
        rows.push((format!("Platform: {platform}"), MetricValue::Count(*count)));
    }
    for (action, count) in &summary.by_action {
        rows.push((format!("Action: {action}"), MetricValue::Count(*count)));
    }
    rows
}

/// The `n` states with the most updates, ties broken by state code.
pub fn top_states(summary: &ReconSummary, n: usize) -> Vec<(&str, usize)> {
    let mut states: Vec<(&str, usize)> = summary
        .by_state
        .iter()
        .map(|(s, c)| (s.as_str(), *c))
        .collect();
    states.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    states.truncate(n);
    states
}
