//! Default construction and defaulting accessors for `ProgressRecord`.
//!
//! Absent map entries are never surfaced as `None`: shards read as 0, targets
//! as `default_target_shards`, item progress as `ItemProgress::default()`.

use std::collections::BTreeMap;

use crate::goals::legacy_target;
use crate::{Catalog, ItemId, ItemProgress, ItemProgressMap, LegacyGoal, ProgressRecord, SinnerId};

/// Default owned/goal/enabled entry for every catalog item.
pub fn empty_item_progress(catalog: &Catalog) -> ItemProgressMap {
    catalog
        .sinners
        .iter()
        .map(|sinner| {
            let items = sinner
                .identities
                .iter()
                .chain(&sinner.egos)
                .map(|item| (item.id.clone(), ItemProgress::default()))
                .collect();
            (sinner.id.clone(), items)
        })
        .collect()
}

impl ProgressRecord {
    /// Fresh record: one 000 legacy goal per Sinner, no shards except the
    /// configured starting amount on the default active Sinner.
    pub fn new(catalog: &Catalog) -> Self {
        let c = &catalog.constants;
        let active = catalog.default_active_sinner().to_string();

        let mut sinner_shards = BTreeMap::new();
        let mut sinner_targets = BTreeMap::new();
        let mut sinner_goals = BTreeMap::new();
        for name in catalog.sinner_names() {
            let goal = LegacyGoal::default();
            sinner_shards.insert(name.to_string(), 0);
            let target = legacy_target(&goal, c).unwrap_or(c.default_target_shards);
            sinner_targets.insert(name.to_string(), target);
            sinner_goals.insert(name.to_string(), goal);
        }
        sinner_shards.insert(active.clone(), c.initial_shards_owned);

        Self {
            active_sinner: active,
            sinner_shards,
            sinner_targets,
            sinner_goals,
            item_progress: empty_item_progress(catalog),
            runs_completed: 0,
            total_shards_gained: 0,
            bonus_shards_total: 0,
            unopened_boxes: 0,
            history: Vec::new(),
        }
    }

    pub fn shards_for(&self, name: &str) -> u64 {
        self.sinner_shards.get(name).copied().unwrap_or(0)
    }

    pub fn target_for(&self, name: &str, catalog: &Catalog) -> u64 {
        self.sinner_targets
            .get(name)
            .copied()
            .unwrap_or(catalog.constants.default_target_shards)
    }

    pub fn legacy_goal_for(&self, name: &str) -> LegacyGoal {
        self.sinner_goals.get(name).copied().unwrap_or_default()
    }

    pub fn item_state(&self, sinner: &SinnerId, item: &ItemId) -> ItemProgress {
        self.item_progress
            .get(sinner)
            .and_then(|items| items.get(item))
            .copied()
            .unwrap_or_default()
    }

    /// Creates the default entry on first access.
    pub fn item_state_mut(&mut self, sinner: &SinnerId, item: &ItemId) -> &mut ItemProgress {
        self.item_progress
            .entry(sinner.clone())
            .or_default()
            .entry(item.clone())
            .or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_fixtures::{base_catalog, ROSTER};
    use crate::{ItemId, ItemProgress, ProgressRecord, SinnerId};

    #[test]
    fn new_record_covers_full_roster() {
        let catalog = base_catalog();
        let record = ProgressRecord::new(&catalog);
        assert_eq!(record.active_sinner, "Yi Sang");
        for name in ROSTER {
            assert_eq!(record.sinner_shards[name], 0);
            assert_eq!(record.sinner_targets[name], 400);
            assert_eq!(record.sinner_goals[name].count_000, 1);
            assert_eq!(record.sinner_goals[name].count_00, 0);
        }
        assert!(record.history.is_empty());
    }

    #[test]
    fn new_record_seeds_initial_shards_on_active() {
        let mut catalog = base_catalog();
        catalog.constants.initial_shards_owned = 75;
        catalog.constants.default_active_sinner = "Gregor".to_string();
        let record = ProgressRecord::new(&catalog);
        assert_eq!(record.active_sinner, "Gregor");
        assert_eq!(record.shards_for("Gregor"), 75);
        assert_eq!(record.shards_for("Yi Sang"), 0);
    }

    #[test]
    fn new_record_has_default_entry_for_every_item() {
        let catalog = base_catalog();
        let record = ProgressRecord::new(&catalog);
        for sinner in &catalog.sinners {
            for item in sinner.identities.iter().chain(&sinner.egos) {
                assert_eq!(record.item_progress[&sinner.id][&item.id], ItemProgress::default());
            }
        }
    }

    #[test]
    fn missing_entries_read_as_defaults() {
        let catalog = base_catalog();
        let mut record = ProgressRecord::new(&catalog);
        record.sinner_shards.clear();
        record.sinner_targets.clear();
        record.item_progress.clear();

        assert_eq!(record.shards_for("Faust"), 0);
        assert_eq!(record.target_for("Faust", &catalog), 400);
        let state = record.item_state(&SinnerId("faust".into()), &ItemId("faust-lcb".into()));
        assert_eq!(state, ItemProgress::default());
        assert!(state.enabled);
    }

    #[test]
    fn item_state_mut_creates_entry_lazily() {
        let catalog = base_catalog();
        let mut record = ProgressRecord::new(&catalog);
        record.item_progress.clear();
        let sinner = SinnerId("outis".into());
        let item = ItemId("outis-lcb".into());
        record.item_state_mut(&sinner, &item).owned = true;
        assert!(record.item_state(&sinner, &item).owned);
        assert!(record.item_state(&sinner, &item).enabled);
    }
}
