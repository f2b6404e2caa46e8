//! Derives each Sinner's shard target from its enabled goal items.

use serde::Serialize;

use crate::{Catalog, Constants, ItemId, ItemKind, LegacyGoal, ProgressRecord};

/// A goal item of one Sinner, as listed under "tracked IDs & EGOs".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalItem {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub label: String,
    pub cost: u64,
    pub enabled: bool,
}

/// Target implied by the count-based goal: `count000 × 400 + count00 × 150`
/// with production costs. `None` when the total does not fit in a `u64`.
pub fn legacy_target(goal: &LegacyGoal, constants: &Constants) -> Option<u64> {
    let ids_000 = goal.count_000.checked_mul(constants.cost_per_000)?;
    let ids_00 = goal.count_00.checked_mul(constants.cost_per_00)?;
    ids_000.checked_add(ids_00)
}

/// Sum of costs over the Sinner's goal items that are not disabled.
pub fn goal_total(record: &ProgressRecord, catalog: &Catalog, name: &str) -> u64 {
    let Some(sinner) = catalog.sinner(name) else {
        return 0;
    };
    catalog
        .items_for(name)
        .into_iter()
        .filter(|entry| {
            let state = record.item_state(&sinner.id, &entry.item.id);
            state.goal && state.enabled
        })
        .map(|entry| catalog.cost_for(entry.item))
        .sum()
}

/// Overwrites the Sinner's target with its goal total. A Sinner with no
/// enabled goals ends up at 0, not at its legacy target.
pub fn recompute_target(record: &mut ProgressRecord, catalog: &Catalog, name: &str) {
    if !catalog.is_sinner(name) {
        return;
    }
    let total = goal_total(record, catalog, name);
    tracing::debug!(sinner = name, target = total, "recomputed target from goals");
    record.sinner_targets.insert(name.to_string(), total);
}

pub fn recompute_all_targets(record: &mut ProgressRecord, catalog: &Catalog) {
    for sinner in &catalog.sinners {
        recompute_target(record, catalog, &sinner.name);
    }
}

/// Goal items of a Sinner in catalog order, disabled ones included.
pub fn goal_items(record: &ProgressRecord, catalog: &Catalog, name: &str) -> Vec<GoalItem> {
    let Some(sinner) = catalog.sinner(name) else {
        return Vec::new();
    };
    catalog
        .items_for(name)
        .into_iter()
        .filter_map(|entry| {
            let state = record.item_state(&sinner.id, &entry.item.id);
            state.goal.then(|| GoalItem {
                id: entry.item.id.clone(),
                name: entry.item.name.clone(),
                kind: entry.kind,
                label: catalog.rarity_label(&entry),
                cost: catalog.cost_for(entry.item),
                enabled: state.enabled,
            })
        })
        .collect()
}

/// True when any item of any Sinner is marked as a goal.
pub fn has_any_goal(record: &ProgressRecord) -> bool {
    record
        .item_progress
        .values()
        .flat_map(|items| items.values())
        .any(|state| state.goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_catalog, base_constants, base_record};
    use crate::{ItemId, SinnerId};

    fn set_goal(record: &mut ProgressRecord, sinner: &str, item: &str, enabled: bool) {
        let state = record.item_state_mut(&SinnerId(sinner.into()), &ItemId(item.into()));
        state.goal = true;
        state.enabled = enabled;
    }

    #[test]
    fn legacy_target_uses_cost_constants() {
        let c = base_constants();
        let goal = LegacyGoal {
            count_000: 2,
            count_00: 3,
        };
        assert_eq!(legacy_target(&goal, &c), Some(2 * 400 + 3 * 150));
    }

    #[test]
    fn legacy_target_that_overflows_is_none() {
        let c = base_constants();
        let huge_000 = LegacyGoal {
            count_000: u64::MAX / 100,
            count_00: 0,
        };
        assert_eq!(legacy_target(&huge_000, &c), None);

        // Each product fits, the sum does not.
        let huge_sum = LegacyGoal {
            count_000: u64::MAX / 400,
            count_00: u64::MAX / 150,
        };
        assert_eq!(legacy_target(&huge_sum, &c), None);
    }

    #[test]
    fn target_sums_enabled_goals_only() {
        let catalog = base_catalog();
        let mut record = base_record(&catalog);
        set_goal(&mut record, "yi-sang", "yi-sang-blade-lineage", true);
        set_goal(&mut record, "yi-sang", "yi-sang-south-section-6", true);
        set_goal(&mut record, "yi-sang", "yi-sang-sunshower", false);

        recompute_target(&mut record, &catalog, "Yi Sang");
        assert_eq!(record.sinner_targets["Yi Sang"], 550);
    }

    #[test]
    fn target_with_no_goals_is_zero_not_legacy() {
        let catalog = base_catalog();
        let mut record = base_record(&catalog);
        assert_eq!(record.sinner_targets["Faust"], 400);
        recompute_target(&mut record, &catalog, "Faust");
        assert_eq!(record.sinner_targets["Faust"], 0);
    }

    #[test]
    fn base_goal_contributes_nothing() {
        let catalog = base_catalog();
        let mut record = base_record(&catalog);
        set_goal(&mut record, "yi-sang", "yi-sang-lcb", true);
        recompute_target(&mut record, &catalog, "Yi Sang");
        assert_eq!(record.sinner_targets["Yi Sang"], 0);
    }

    #[test]
    fn goal_items_include_disabled_goals() {
        let catalog = base_catalog();
        let mut record = base_record(&catalog);
        set_goal(&mut record, "yi-sang", "yi-sang-sunshower", false);
        set_goal(&mut record, "yi-sang", "yi-sang-blade-lineage", true);

        let items = goal_items(&record, &catalog, "Yi Sang");
        let ids: Vec<&str> = items.iter().map(|g| g.id.0.as_str()).collect();
        assert_eq!(ids, ["yi-sang-blade-lineage", "yi-sang-sunshower"]);
        assert!(items[0].enabled);
        assert!(!items[1].enabled);
        assert_eq!(items[1].kind, ItemKind::Ego);
        assert!(goal_items(&record, &catalog, "Faust").is_empty());
    }

    #[test]
    fn unknown_sinner_is_ignored() {
        let catalog = base_catalog();
        let mut record = base_record(&catalog);
        recompute_target(&mut record, &catalog, "Dante");
        assert!(!record.sinner_targets.contains_key("Dante"));
    }

    #[test]
    fn goals_stored_for_items_outside_catalog_do_not_count() {
        let catalog = base_catalog();
        let mut record = base_record(&catalog);
        set_goal(&mut record, "yi-sang", "yi-sang-retired-identity", true);
        recompute_all_targets(&mut record, &catalog);
        assert_eq!(record.sinner_targets["Yi Sang"], 0);
        assert!(has_any_goal(&record));
    }
}
