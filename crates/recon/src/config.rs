use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ReconError;
use crate::states::StateTable;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub rules: BusinessRules,
    /// Extra or corrected full-name → code entries for the edits feed.
    #[serde(default)]
    pub state_codes: BTreeMap<String, String>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "Jurisdiction sync".into()
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub apex: ApexSource,
    pub command: CommandSource,
    pub edits: EditsSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApexSource {
    pub file: String,
    /// Worksheet name; the first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: ApexColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandSource {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: CommandColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditsSource {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: EditsColumns,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Zero-based column positions in the APEX report. The value column holds the
/// tax code on `TaxCode` rows and the rate on `Total Rate` rows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApexColumns {
    pub marker: usize,
    pub value: usize,
    pub location: usize,
}

impl Default for ApexColumns {
    fn default() -> Self {
        Self {
            marker: 0,
            value: 1,
            location: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandColumns {
    pub tax_code: String,
    pub description: String,
    pub short_description: String,
}

impl Default for CommandColumns {
    fn default() -> Self {
        Self {
            tax_code: "Tax code".into(),
            description: "Description".into(),
            short_description: "Short description".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditsColumns {
    pub state: String,
    pub jurisdiction_name: String,
    pub old_rate: String,
    pub new_rate: String,
    pub effective_date: String,
    pub change_type: String,
    pub jurisdiction_type: String,
}

impl Default for EditsColumns {
    fn default() -> Self {
        Self {
            state: "State".into(),
            jurisdiction_name: "Jurisdiction Name".into(),
            old_rate: "Old Rate".into(),
            new_rate: "New Rate".into(),
            effective_date: "Effective Date".into(),
            change_type: "Change Type".into(),
            jurisdiction_type: "Jurisdiction Type".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rules + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BusinessRules {
    /// Change types never reported, compared after trimming.
    pub excluded_change_types: Vec<String>,
    /// A row is reported only when `|rate_change|` is strictly greater.
    pub min_rate_change_threshold: f64,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            excluded_change_types: vec!["Expired".into()],
            min_rate_change_threshold: 0.0,
        }
    }
}

impl BusinessRules {
    pub fn is_excluded(&self, change_type: Option<&str>) -> bool {
        match change_type {
            Some(ct) => {
                let ct = ct.trim();
                self.excluded_change_types.iter().any(|x| x.trim() == ct)
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub excel: bool,
    pub csv: bool,
    pub console: bool,
    pub filename_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".into(),
            excel: true,
            csv: true,
            console: true,
            filename_prefix: "tax_update_report".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let invalid =
            |msg: String| -> Result<(), ReconError> { Err(ReconError::ConfigValidation(msg)) };

        for (name, file) in [
            ("apex", &self.sources.apex.file),
            ("command", &self.sources.command.file),
            ("edits", &self.sources.edits.file),
        ] {
            if file.trim().is_empty() {
                return invalid(format!("sources.{name}.file must not be empty"));
            }
        }

        let apex = &self.sources.apex.columns;
        if apex.marker == apex.value || apex.marker == apex.location || apex.value == apex.location
        {
            return invalid(format!(
                "sources.apex.columns must be distinct, got marker={} value={} location={}",
                apex.marker, apex.value, apex.location
            ));
        }

        let cmd = &self.sources.command.columns;
        let edits = &self.sources.edits.columns;
        let named = [
            ("command", "tax_code", &cmd.tax_code),
            ("command", "description", &cmd.description),
            ("command", "short_description", &cmd.short_description),
            ("edits", "state", &edits.state),
            ("edits", "jurisdiction_name", &edits.jurisdiction_name),
            ("edits", "old_rate", &edits.old_rate),
            ("edits", "new_rate", &edits.new_rate),
            ("edits", "effective_date", &edits.effective_date),
            ("edits", "change_type", &edits.change_type),
            ("edits", "jurisdiction_type", &edits.jurisdiction_type),
        ];
        for (source, field, column) in named {
            if column.trim().is_empty() {
                return invalid(format!("sources.{source}.columns.{field} must not be empty"));
            }
        }

        let threshold = self.rules.min_rate_change_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return invalid(format!(
                "rules.min_rate_change_threshold must be a non-negative number, got {threshold}"
            ));
        }

        for (name, code) in &self.state_codes {
            let code = code.trim();
            if name.trim().is_empty() {
                return invalid("state_codes: empty state name".into());
            }
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return invalid(format!(
                    "state_codes.\"{name}\": expected a 2-letter code, got '{code}'"
                ));
            }
        }

        if self.output.filename_prefix.trim().is_empty() {
            return invalid("output.filename_prefix must not be empty".into());
        }

        Ok(())
    }

    /// Built-in state table with this config's overrides applied.
    pub fn state_table(&self) -> StateTable {
        StateTable::with_overrides(self.state_codes.iter())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
