use std::collections::BTreeMap;

use crate::model::{JoinedRecord, ReconSummary, SourceCounts, UpdateRecord};

/// Summary statistics for a run. Group counts cover the update set only.
pub fn compute_summary(
    joined: &[JoinedRecord],
    updates: &[UpdateRecord],
    sources: SourceCounts,
) -> ReconSummary {
    let mut by_platform: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_action: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_state: BTreeMap<String, usize> = BTreeMap::new();

    for u in updates {
        *by_platform.entry(u.update_platform().to_string()).or_insert(0) += 1;
        *by_action.entry(u.action_required.to_string()).or_insert(0) += 1;
        *by_state.entry(u.state().to_string()).or_insert(0) += 1;
    }

    ReconSummary {
        total_records_processed: joined.len(),
        records_requiring_update: updates.len(),
        by_platform,
        by_action,
        by_state,
        sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::platform_for;
    use crate::model::{ActionRequired, JoinSide, ReconciledRecord, SourceStats};

    fn joined(state: &str, side: JoinSide) -> JoinedRecord {
        JoinedRecord {
            platforms: ReconciledRecord {
                city_state_key: format!("X_{state}"),
                city: "X".into(),
                state: state.into(),
                tax_code_apex: None,
                total_rate: None,
                tax_code_command: None,
                description: None,
                short_description: None,
                update_platform: platform_for(side),
                join: side,
            },
            jurisdiction: "X".into(),
            old_rate: 0.0,
            new_rate: 0.01,
            rate_change: 0.01,
            effective_date: None,
            change_type: None,
            jurisdiction_type: None,
        }
    }

    fn update(state: &str, side: JoinSide, action: ActionRequired) -> UpdateRecord {
        UpdateRecord {
            joined: joined(state, side),
            action_required: action,
        }
    }

    #[test]
    fn summary_counts() {
        let all = vec![
            joined("TX", JoinSide::Both),
            joined("TX", JoinSide::Both),
            joined("AZ", JoinSide::LeftOnly),
            joined("CO", JoinSide::RightOnly),
        ];
        let updates = vec![
            update("TX", JoinSide::Both, ActionRequired::RateIncrease),
            update("AZ", JoinSide::LeftOnly, ActionRequired::AddToCommand),
            update("TX", JoinSide::Both, ActionRequired::RateDecrease),
        ];
        let sources = SourceCounts {
            apex: SourceStats { records: 3, dropped: 1 },
            ..SourceCounts::default()
        };

        let summary = compute_summary(&all, &updates, sources.clone());
        assert_eq!(summary.total_records_processed, 4);
        assert_eq!(summary.records_requiring_update, 3);
        assert_eq!(summary.by_platform["BOTH"], 2);
        assert_eq!(summary.by_platform["ADD_TO_COMMAND"], 1);
        assert!(!summary.by_platform.contains_key("ADD_TO_APEX"));
        assert_eq!(summary.by_action["Incremento de tasa"], 1);
        assert_eq!(summary.by_action["Agregar a COMMAND"], 1);
        assert_eq!(summary.by_state["TX"], 2);
        assert_eq!(summary.by_state["AZ"], 1);
        assert!(!summary.by_state.contains_key("CO"));
        assert_eq!(summary.sources, sources);
    }

    #[test]
    fn empty_run() {
        let summary = compute_summary(&[], &[], SourceCounts::default());
        assert_eq!(summary.total_records_processed, 0);
        assert_eq!(summary.records_requiring_update, 0);
        assert!(summary.by_platform.is_empty());
        assert!(summary.by_action.is_empty());
        assert!(summary.by_state.is_empty());
    }
}
