use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::source::SourceKind;
use crate::table::Table;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Raw tables for the three sources, already read from disk.
#[derive(Debug)]
pub struct ReconInput {
    pub apex: Table,
    pub command: Table,
    pub edits: Table,
}

// ---------------------------------------------------------------------------
// Normalized source records
// ---------------------------------------------------------------------------

/// One APEX tax-code block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApexRecord {
    pub tax_code: String,
    pub city: String,
    pub state: String,
    pub total_rate: f64,
    pub city_state_key: String,
    pub source: SourceKind,
}

/// One COMMAND tax-code row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRecord {
    pub tax_code: Option<String>,
    pub city: String,
    pub state: String,
    pub description: String,
    pub short_description: Option<String>,
    pub city_state_key: String,
    pub source: SourceKind,
}

/// One rate-change row from the edits feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditRecord {
    /// Jurisdiction name; plays the role of `city` in the join.
    pub jurisdiction: String,
    pub state: String,
    pub state_name: String,
    pub old_rate: f64,
    pub new_rate: f64,
    pub rate_change: f64,
    pub effective_date: Option<String>,
    pub change_type: Option<String>,
    pub jurisdiction_type: Option<String>,
    pub city_state_key: String,
    pub source: SourceKind,
}

// ---------------------------------------------------------------------------
// Join outcome
// ---------------------------------------------------------------------------

/// Which side(s) of the APEX × COMMAND outer join a key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinSide {
    LeftOnly,
    RightOnly,
    Both,
}

impl std::fmt::Display for JoinSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LeftOnly => write!(f, "left_only"),
            Self::RightOnly => write!(f, "right_only"),
            Self::Both => write!(f, "both"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdatePlatform {
    AddToCommand,
    AddToApex,
    Both,
}

impl std::fmt::Display for UpdatePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddToCommand => write!(f, "ADD_TO_COMMAND"),
            Self::AddToApex => write!(f, "ADD_TO_APEX"),
            Self::Both => write!(f, "BOTH"),
        }
    }
}

/// Manual action an analyst must take. There is no "no change" variant:
/// rows without an action never become update records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ActionRequired {
    #[serde(rename = "Agregar a COMMAND")]
    AddToCommand,
    #[serde(rename = "Agregar a APEX")]
    AddToApex,
    #[serde(rename = "Incremento de tasa")]
    RateIncrease,
    #[serde(rename = "Decremento de tasa")]
    RateDecrease,
}

impl ActionRequired {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddToCommand => "Agregar a COMMAND",
            Self::AddToApex => "Agregar a APEX",
            Self::RateIncrease => "Incremento de tasa",
            Self::RateDecrease => "Decremento de tasa",
        }
    }
}

impl std::fmt::Display for ActionRequired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A row of the APEX × COMMAND outer join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRecord {
    pub city_state_key: String,
    pub city: String,
    pub state: String,
    pub tax_code_apex: Option<String>,
    pub total_rate: Option<f64>,
    pub tax_code_command: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub update_platform: UpdatePlatform,
    pub join: JoinSide,
}

/// A reconciled row matched against a rate edit (pre-filter).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRecord {
    #[serde(flatten)]
    pub platforms: ReconciledRecord,
    pub jurisdiction: String,
    pub old_rate: f64,
    pub new_rate: f64,
    pub rate_change: f64,
    pub effective_date: Option<String>,
    pub change_type: Option<String>,
    pub jurisdiction_type: Option<String>,
}

/// A joined row that survived the business filter, with its action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRecord {
    #[serde(flatten)]
    pub joined: JoinedRecord,
    pub action_required: ActionRequired,
}

impl UpdateRecord {
    pub fn city_state_key(&self) -> &str {
        &self.joined.platforms.city_state_key
    }

    pub fn city(&self) -> &str {
        &self.joined.platforms.city
    }

    pub fn state(&self) -> &str {
        &self.joined.platforms.state
    }

    pub fn update_platform(&self) -> UpdatePlatform {
        self.joined.platforms.update_platform
    }
}

/// Output of the pure pipeline: both sets are needed downstream.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub joined: Vec<JoinedRecord>,
    pub updates: Vec<UpdateRecord>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub records: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceCounts {
    pub apex: SourceStats,
    pub command: SourceStats,
    pub edits: SourceStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_records_processed: usize,
    pub records_requiring_update: usize,
    pub by_platform: BTreeMap<String, usize>,
    pub by_action: BTreeMap<String, usize>,
    pub by_state: BTreeMap<String, usize>,
    pub sources: SourceCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub joined: Vec<JoinedRecord>,
    pub updates: Vec<UpdateRecord>,
}
