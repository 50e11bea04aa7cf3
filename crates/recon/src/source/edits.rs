//! Tax rate edits feed: one rate change per row, states by full name.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EditsColumns;
use crate::key::build_city_state_key;
use crate::model::EditRecord;
use crate::source::{DropReason, Parsed, SourceKind};
use crate::states::StateTable;
use crate::table::Table;

/// `Gilbert (City)`, `Hamilton (County)`
static NAME_WITH_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\((\w+)\)$").expect("name/type pattern"));

/// Name followed by an optional parenthetical that is not a single word.
static NAME_WITH_NOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)(?:\s+\(.+\))?$").expect("name/note pattern"));

static TRAILING_DESCRIPTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(Transactions|Tax|Regional|Metropolitan|District).*$")
        .expect("descriptor pattern")
});

/// Split a jurisdiction name into an upper-cased name and an optional type.
///
/// `"Gilbert (City)"` → `("GILBERT", Some("City"))`;
/// `"Denver Regional Transportation District"` → `("DENVER", None)`.
pub fn parse_jurisdiction_name(raw: &str) -> Option<(String, Option<String>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (name, jtype) = if let Some(caps) = NAME_WITH_TYPE.captures(trimmed) {
        (caps[1].trim().to_uppercase(), Some(caps[2].trim().to_string()))
    } else if let Some(caps) = NAME_WITH_NOTE.captures(trimmed) {
        let name = caps[1].trim().to_uppercase();
        (TRAILING_DESCRIPTOR.replace(&name, "").trim().to_uppercase(), None)
    } else {
        (trimmed.to_uppercase(), None)
    };

    if name.is_empty() {
        None
    } else {
        Some((name, jtype))
    }
}

pub fn parse(table: &Table, columns: &EditsColumns, states: &StateTable) -> Parsed<EditRecord> {
    let idx = |name: &str| {
        let found = table.column_index(name);
        if found.is_none() {
            tracing::warn!(source = %SourceKind::Edits, column = name, "column not found");
        }
        found
    };

    let state_idx = idx(&columns.state);
    let jurisdiction_idx = idx(&columns.jurisdiction_name);
    let old_rate_idx = idx(&columns.old_rate);
    let new_rate_idx = idx(&columns.new_rate);
    let effective_date_idx = idx(&columns.effective_date);
    let change_type_idx = idx(&columns.change_type);
    let jurisdiction_type_idx = idx(&columns.jurisdiction_type);

    let text = |row: usize, col: Option<usize>| col.and_then(|c| table.cell(row, c).display());
    let rate = |row: usize, col: Option<usize>| {
        col.and_then(|c| table.cell(row, c).as_f64()).unwrap_or(0.0)
    };

    let mut out = Parsed::new();

    for row in 0..table.row_count() {
        let state_name = state_idx.and_then(|c| table.cell(row, c).as_text());
        let Some((state_name, state)) =
            state_name.and_then(|name| states.code_for(name).map(|code| (name, code)))
        else {
            out.drop_row(SourceKind::Edits, row, DropReason::UnknownState);
            continue;
        };

        let parsed_name = jurisdiction_idx
            .and_then(|c| table.cell(row, c).as_text())
            .and_then(parse_jurisdiction_name);
        let Some((jurisdiction, parsed_type)) = parsed_name else {
            out.drop_row(SourceKind::Edits, row, DropReason::MissingJurisdiction);
            continue;
        };

        let Some(city_state_key) = build_city_state_key(Some(&jurisdiction), Some(state)) else {
            out.drop_row(SourceKind::Edits, row, DropReason::MissingJurisdiction);
            continue;
        };

        let old_rate = rate(row, old_rate_idx);
        let new_rate = rate(row, new_rate_idx);

        out.records.push(EditRecord {
            jurisdiction,
            state: state.to_string(),
            state_name: state_name.to_string(),
            old_rate,
            new_rate,
            rate_change: new_rate - old_rate,
            effective_date: text(row, effective_date_idx),
            change_type: text(row, change_type_idx),
            jurisdiction_type: text(row, jurisdiction_type_idx).or(parsed_type),
            city_state_key,
            source: SourceKind::Edits,
        });
    }

    out
}
