//! APEX tax-code report: block-structured rows.
//!
//! ```text
//! TaxCode    | PLE    | PLEASANTON, TX
//! State      | ...    | ...
//! Total Rate | 0.0825 |
//! TaxCode    | GIL    | GILBERT, AZ
//! ...
//! ```
//!
//! A `TaxCode` row opens a block, a `Total Rate` row sets its rate. A block is
//! emitted when the next block opens or the input ends, and only if it has a
//! tax code, a numeric rate and a parseable location.

use crate::config::ApexColumns;
use crate::key::{build_city_state_key, parse_city_state_cell};
use crate::model::ApexRecord;
use crate::source::{DropReason, Parsed, SourceKind};
use crate::table::{Cell, Table};

pub const TAX_CODE_MARKER: &str = "TaxCode";
pub const TOTAL_RATE_MARKER: &str = "Total Rate";

struct Block<'a> {
    row: usize,
    tax_code: Option<String>,
    location: &'a Cell,
    total_rate: Option<f64>,
}

pub fn parse(table: &Table, columns: &ApexColumns) -> Parsed<ApexRecord> {
    let mut out = Parsed::new();
    let mut pending: Option<Block<'_>> = None;

    for row in 0..table.row_count() {
        let marker = table.cell(row, columns.marker).as_text();

        match marker {
            Some(TAX_CODE_MARKER) => {
                if let Some(block) = pending.take() {
                    flush(block, &mut out);
                }
                pending = Some(Block {
                    row,
                    tax_code: table.cell(row, columns.value).display(),
                    location: table.cell(row, columns.location),
                    total_rate: None,
                });
            }
            Some(TOTAL_RATE_MARKER) => {
                // A rate row outside any block has nothing to close
                if let Some(block) = pending.as_mut() {
                    block.total_rate = table.cell(row, columns.value).as_f64();
                }
            }
            _ => {}
        }
    }

    if let Some(block) = pending.take() {
        flush(block, &mut out);
    }

    out
}

fn flush(block: Block<'_>, out: &mut Parsed<ApexRecord>) {
    let Some(tax_code) = block.tax_code else {
        out.drop_row(SourceKind::Apex, block.row, DropReason::MissingTaxCode);
        return;
    };
    let Some(total_rate) = block.total_rate else {
        out.drop_row(SourceKind::Apex, block.row, DropReason::MissingTotalRate);
        return;
    };
    let Some((city, state)) = parse_city_state_cell(block.location) else {
        out.drop_row(SourceKind::Apex, block.row, DropReason::UnparseableLocation);
        return;
    };
    let Some(city_state_key) = build_city_state_key(Some(&city), Some(&state)) else {
        out.drop_row(SourceKind::Apex, block.row, DropReason::UnparseableLocation);
        return;
    };

    out.records.push(ApexRecord {
        tax_code,
        city,
        state,
        total_rate,
        city_state_key,
        source: SourceKind::Apex,
    });
}
