use crate::classify::filter_updates;
use crate::config::{BusinessRules, ReconConfig};
use crate::error::ReconError;
use crate::matcher::{inner_join, outer_join};
use crate::model::{
    ApexRecord, CommandRecord, EditRecord, ReconInput, ReconMeta, ReconResult, Reconciliation,
    SourceCounts, SourceStats,
};
use crate::source::{apex, command, edits, Parsed};
use crate::summary::compute_summary;

/// Outer join the platforms, inner join the edits, apply the business filter.
pub fn reconcile(
    apex: &[ApexRecord],
    command: &[CommandRecord],
    edits: &[EditRecord],
    rules: &BusinessRules,
) -> Reconciliation {
    let reconciled = outer_join(apex, command);
    tracing::info!(rows = reconciled.len(), "outer join apex x command");

    let joined = inner_join(&reconciled, edits);
    tracing::info!(rows = joined.len(), "inner join against edits");

    let updates = filter_updates(&joined, rules);
    tracing::info!(rows = updates.len(), "records requiring update");

    Reconciliation { joined, updates }
}

fn stats<T>(parsed: &Parsed<T>) -> SourceStats {
    SourceStats {
        records: parsed.records.len(),
        dropped: parsed.dropped.len(),
    }
}

/// Parse the three tables and reconcile them per config.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let apex = apex::parse(&input.apex, &config.sources.apex.columns);
    let command = command::parse(&input.command, &config.sources.command.columns)?;
    let edits = edits::parse(&input.edits, &config.sources.edits.columns, &config.state_table());

    let sources = SourceCounts {
        apex: stats(&apex),
        command: stats(&command),
        edits: stats(&edits),
    };
    tracing::info!(
        apex = sources.apex.records,
        command = sources.command.records,
        edits = sources.edits.records,
        dropped = sources.apex.dropped + sources.command.dropped + sources.edits.dropped,
        "sources parsed"
    );

    let Reconciliation { joined, updates } =
        reconcile(&apex.records, &command.records, &edits.records, &config.rules);
    let summary = compute_summary(&joined, &updates, sources);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Local::now(),
        },
        summary,
        joined,
        updates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActionRequired;
    use crate::table::{Cell, Table};

    const CONFIG: &str = r#"
[sources.apex]
file = "apex.xlsx"
[sources.command]
file = "command.xlsx"
[sources.edits]
file = "edits.xlsx"
"#;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn input() -> ReconInput {
        let apex = Table::new(
            headers(&["Tax Code Report", "", ""]),
            vec![
                vec!["TaxCode".into(), "GIL".into(), "GILBERT, AZ".into()],
                vec!["Total Rate".into(), Cell::Number(0.071)],
                vec!["TaxCode".into(), "DAL".into(), "DALLAS, TX".into()],
                vec!["Total Rate".into(), Cell::Number(0.0825)],
            ],
        );
        let command = Table::new(
            headers(&["Tax code", "Description", "Short description"]),
            vec![
                vec!["D1".into(), "DALLAS, TX".into(), "Dallas".into()],
                vec!["X1".into(), "not a location".into(), "".into()],
            ],
        );
        let edits = Table::new(
            headers(&["State", "Jurisdiction Name", "Old Rate", "New Rate", "Change Type"]),
            vec![
                vec![
                    "Arizona".into(),
                    "Gilbert (City)".into(),
                    Cell::Number(0.065),
                    Cell::Number(0.071),
                    "Added".into(),
                ],
                vec![
                    "Texas".into(),
                    "Dallas (City)".into(),
                    Cell::Number(0.0825),
                    Cell::Number(0.08),
                    "Modified".into(),
                ],
            ],
        );
        ReconInput { apex, command, edits }
    }

    #[test]
    fn run_end_to_end() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let result = run(&config, &input()).unwrap();

        assert_eq!(result.meta.config_name, "Jurisdiction sync");
        assert_eq!(result.summary.sources.apex.records, 2);
        assert_eq!(result.summary.sources.command.records, 1);
        assert_eq!(result.summary.sources.command.dropped, 1);
        assert_eq!(result.summary.sources.edits.records, 2);

        assert_eq!(result.joined.len(), 2);
        assert_eq!(result.updates.len(), 2);
        assert_eq!(result.summary.total_records_processed, 2);

        // Key order: DALLAS_TX < GILBERT_AZ
        assert_eq!(result.updates[0].city_state_key(), "DALLAS_TX");
        assert_eq!(result.updates[0].action_required, ActionRequired::RateDecrease);
        assert_eq!(result.updates[1].city_state_key(), "GILBERT_AZ");
        assert_eq!(result.updates[1].action_required, ActionRequired::AddToCommand);
    }

    #[test]
    fn missing_command_column_fails_the_run() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let mut input = input();
        input.command.headers = headers(&["Tax code", "Description"]);
        let err = run(&config, &input).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { .. }));
    }

    #[test]
    fn reconcile_with_no_overlap_is_empty() {
        let result = reconcile(&[], &[], &[], &BusinessRules::default());
        assert!(result.joined.is_empty());
        assert!(result.updates.is_empty());
    }
}
