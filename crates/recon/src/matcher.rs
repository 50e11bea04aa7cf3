use std::collections::{BTreeMap, BTreeSet};

use crate::classify::platform_for;
use crate::model::{ApexRecord, CommandRecord, EditRecord, JoinSide, JoinedRecord, ReconciledRecord};

fn index_by_key<'a, T>(
    records: &'a [T],
    key: impl Fn(&T) -> &str,
) -> BTreeMap<&'a str, Vec<&'a T>> {
    let mut map: BTreeMap<&str, Vec<&T>> = BTreeMap::new();
    for r in records {
        map.entry(key(r)).or_default().push(r);
    }
    map
}

/// Full outer join of the two platforms on `city_state_key`.
///
/// Output is ordered by key. A key present several times on either side
/// yields every left × right combination. City and state come from the APEX
/// row when there is one, else from the COMMAND row.
pub fn outer_join(apex: &[ApexRecord], command: &[CommandRecord]) -> Vec<ReconciledRecord> {
    let left = index_by_key(apex, |r| r.city_state_key.as_str());
    let right = index_by_key(command, |r| r.city_state_key.as_str());

    let keys: BTreeSet<&str> = left.keys().chain(right.keys()).copied().collect();
    let mut out = Vec::with_capacity(keys.len());

    for key in keys {
        match (left.get(key), right.get(key)) {
            (Some(ls), Some(rs)) => {
                for l in ls {
                    for r in rs {
                        out.push(reconciled(key, Some(*l), Some(*r), JoinSide::Both));
                    }
                }
            }
            (Some(ls), None) => {
                for l in ls {
                    out.push(reconciled(key, Some(*l), None, JoinSide::LeftOnly));
                }
            }
            (None, Some(rs)) => {
                for r in rs {
                    out.push(reconciled(key, None, Some(*r), JoinSide::RightOnly));
                }
            }
            (None, None) => {}
        }
    }

    out
}

fn reconciled(
    key: &str,
    apex: Option<&ApexRecord>,
    command: Option<&CommandRecord>,
    join: JoinSide,
) -> ReconciledRecord {
    let city = apex
        .map(|a| a.city.clone())
        .or_else(|| command.map(|c| c.city.clone()))
        .unwrap_or_default();
    let state = apex
        .map(|a| a.state.clone())
        .or_else(|| command.map(|c| c.state.clone()))
        .unwrap_or_default();

    ReconciledRecord {
        city_state_key: key.to_string(),
        city,
        state,
        tax_code_apex: apex.map(|a| a.tax_code.clone()),
        total_rate: apex.map(|a| a.total_rate),
        tax_code_command: command.and_then(|c| c.tax_code.clone()),
        description: command.map(|c| c.description.clone()),
        short_description: command.and_then(|c| c.short_description.clone()),
        update_platform: platform_for(join),
        join,
    }
}

/// Inner join of the reconciled platform rows against the rate edits.
///
/// Rows whose key has no edit are dropped. Order follows `reconciled`; a key
/// with several edits yields one row per edit, in edit order.
pub fn inner_join(reconciled: &[ReconciledRecord], edits: &[EditRecord]) -> Vec<JoinedRecord> {
    let by_key = index_by_key(edits, |e| e.city_state_key.as_str());

    let mut out = Vec::new();
    for rec in reconciled {
        let Some(matches) = by_key.get(rec.city_state_key.as_str()) else {
            continue;
        };
        for edit in matches {
            out.push(JoinedRecord {
                platforms: rec.clone(),
                jurisdiction: edit.jurisdiction.clone(),
                old_rate: edit.old_rate,
                new_rate: edit.new_rate,
                rate_change: edit.rate_change,
                effective_date: edit.effective_date.clone(),
                change_type: edit.change_type.clone(),
                jurisdiction_type: edit.jurisdiction_type.clone(),
            });
        }
    }
    out
}
