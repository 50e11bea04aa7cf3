//! Source parsers: one raw table in, normalized records out.
//!
//! Rows that cannot produce a valid `city_state_key` are not errors. Each
//! parser drops them explicitly and reports them in [`Parsed::dropped`].

pub mod apex;
pub mod command;
pub mod edits;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceKind {
    Apex,
    Command,
    Edits,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apex => write!(f, "APEX"),
            Self::Command => write!(f, "COMMAND"),
            Self::Edits => write!(f, "EDITS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Location / description is not `"CITY, ST"`.
    UnparseableLocation,
    /// APEX block closed without a numeric total rate.
    MissingTotalRate,
    /// APEX block opened with an empty tax-code cell.
    MissingTaxCode,
    /// Edits state name missing or not in the state table.
    UnknownState,
    /// Edits jurisdiction name missing or empty after cleanup.
    MissingJurisdiction,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnparseableLocation => write!(f, "unparseable location"),
            Self::MissingTotalRate => write!(f, "missing total rate"),
            Self::MissingTaxCode => write!(f, "missing tax code"),
            Self::UnknownState => write!(f, "unknown state"),
            Self::MissingJurisdiction => write!(f, "missing jurisdiction"),
        }
    }
}

/// A row (or, for APEX, the row that opened a block) excluded from a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    /// Zero-based data row index (header row excluded).
    pub row: usize,
    pub reason: DropReason,
}

#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub dropped: Vec<DroppedRow>,
}

impl<T> Parsed<T> {
    pub(crate) fn new() -> Self {
        Self { records: Vec::new(), dropped: Vec::new() }
    }

    pub(crate) fn drop_row(&mut self, source: SourceKind, row: usize, reason: DropReason) {
        tracing::debug!(%source, row, %reason, "dropping row");
        self.dropped.push(DroppedRow { row, reason });
    }
}
