//! COMMAND tax-code report: one row per tax code, location in the description.

use crate::config::CommandColumns;
use crate::error::ReconError;
use crate::key::{build_city_state_key, parse_city_state_cell};
use crate::model::CommandRecord;
use crate::source::{DropReason, Parsed, SourceKind};
use crate::table::Table;

pub fn parse(table: &Table, columns: &CommandColumns) -> Result<Parsed<CommandRecord>, ReconError> {
    let idx = |name: &str| -> Result<usize, ReconError> {
        table.column_index(name).ok_or_else(|| ReconError::MissingColumn {
            source: SourceKind::Command,
            column: name.into(),
        })
    };

    let tax_code_idx = idx(&columns.tax_code)?;
    let description_idx = idx(&columns.description)?;
    let short_description_idx = idx(&columns.short_description)?;

    let mut out = Parsed::new();

    for row in 0..table.row_count() {
        let description = table.cell(row, description_idx);
        let parsed = parse_city_state_cell(description).and_then(|(city, state)| {
            build_city_state_key(Some(&city), Some(&state)).map(|key| (city, state, key))
        });
        let Some((city, state, city_state_key)) = parsed else {
            out.drop_row(SourceKind::Command, row, DropReason::UnparseableLocation);
            continue;
        };

        out.records.push(CommandRecord {
            tax_code: table.cell(row, tax_code_idx).display(),
            city,
            state,
            // parse_city_state_cell only accepts text cells
            description: description.as_text().unwrap_or_default().to_string(),
            short_description: table.cell(row, short_description_idx).display(),
            city_state_key,
            source: SourceKind::Command,
        });
    }

    Ok(out)
}
