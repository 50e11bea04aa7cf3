use crate::config::BusinessRules;
use crate::model::{ActionRequired, JoinSide, JoinedRecord, UpdatePlatform, UpdateRecord};

/// Which platform is missing the jurisdiction, if any.
pub fn platform_for(side: JoinSide) -> UpdatePlatform {
    match side {
        JoinSide::LeftOnly => UpdatePlatform::AddToCommand,
        JoinSide::RightOnly => UpdatePlatform::AddToApex,
        JoinSide::Both => UpdatePlatform::Both,
    }
}

/// Action for a joined row.
///
/// A jurisdiction missing from a platform must be added there regardless of
/// the rate direction. Only rows present on both platforms are classified by
/// the sign of `rate_change`; an unchanged rate has no action.
pub fn decide_action(platform: UpdatePlatform, rate_change: f64) -> Option<ActionRequired> {
    match platform {
        UpdatePlatform::AddToCommand => Some(ActionRequired::AddToCommand),
        UpdatePlatform::AddToApex => Some(ActionRequired::AddToApex),
        UpdatePlatform::Both if rate_change > 0.0 => Some(ActionRequired::RateIncrease),
        UpdatePlatform::Both if rate_change < 0.0 => Some(ActionRequired::RateDecrease),
        UpdatePlatform::Both => None,
    }
}

/// True when the row's rate moved by more than the threshold and its change
/// type is not excluded.
pub fn is_actionable(row: &JoinedRecord, rules: &BusinessRules) -> bool {
    row.rate_change.abs() > rules.min_rate_change_threshold
        && !rules.is_excluded(row.change_type.as_deref())
}

/// Business filter over the joined set. Order is preserved.
pub fn filter_updates(joined: &[JoinedRecord], rules: &BusinessRules) -> Vec<UpdateRecord> {
    joined
        .iter()
        .filter(|row| is_actionable(row, rules))
        .filter_map(|row| {
            decide_action(row.platforms.update_platform, row.rate_change).map(|action| {
                UpdateRecord {
                    joined: row.clone(),
                    action_required: action,
                }
            })
        })
        .collect()
}
