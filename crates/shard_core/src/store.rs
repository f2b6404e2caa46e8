//! Loading, merging and saving the persisted `ProgressRecord`.
//!
//! Storage is a single named slot behind the `Persistence` trait. Loading
//! never fails: a missing or unreadable blob yields the default record, and
//! every stored field is merged onto the default record on its own, so a
//! malformed field falls back to its default instead of poisoning the rest.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::goals::recompute_all_targets;
use crate::input::floor_f64;
use crate::record::empty_item_progress;
use crate::{
    Catalog, HistoryEntry, ItemId, ItemProgress, ItemProgressMap, LegacyGoal, ProgressRecord,
    SinnerId,
};

/// Slot name used by every release so far.
pub const STORAGE_KEY: &str = "mdShardCalculatorState_v1";

/// A key-value store holding serialized blobs.
pub trait Persistence {
    /// `Ok(None)` when nothing has been stored under `key`.
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&mut self, key: &str, blob: &str) -> anyhow::Result<()>;
}

/// In-process store; contents live as long as the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    slots: HashMap<String, String>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, blob: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.slots.insert(key.to_string(), blob.into());
        store
    }

    pub fn blob(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl Persistence for MemoryPersistence {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &str) -> anyhow::Result<()> {
        self.slots.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

pub fn load(persistence: &impl Persistence, catalog: &Catalog) -> ProgressRecord {
    let raw = match persistence.read(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ProgressRecord::new(catalog),
        Err(err) => {
            tracing::error!("failed to load state: {err:#}");
            return ProgressRecord::new(catalog);
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(stored)) => merge_stored(&stored, catalog),
        Ok(other) => {
            tracing::error!("failed to load state: expected a JSON object, found {other}");
            ProgressRecord::new(catalog)
        }
        Err(err) => {
            tracing::error!("failed to load state: {err}");
            ProgressRecord::new(catalog)
        }
    }
}

/// Writes the record; failures are logged and otherwise ignored.
pub fn save(persistence: &mut impl Persistence, record: &ProgressRecord) {
    let blob = match serde_json::to_string(record) {
        Ok(blob) => blob,
        Err(err) => {
            tracing::error!("failed to save state: {err}");
            return;
        }
    };
    if let Err(err) = persistence.write(STORAGE_KEY, &blob) {
        tracing::error!("failed to save state: {err:#}");
    }
}

/// Builds a record from a stored JSON object, field by field.
pub fn merge_stored(stored: &Map<String, Value>, catalog: &Catalog) -> ProgressRecord {
    let mut record = ProgressRecord::new(catalog);

    // Single-Sinner blobs from before per-Sinner tracking.
    if is_absent(stored.get("sinnerShards")) {
        if let Some(legacy) = stored.get("currentShards").and_then(coerce_count) {
            record.sinner_shards.insert(record.active_sinner.clone(), legacy);
        }
    }

    record.active_sinner =
        merge_active_sinner(stored.get("activeSinner"), catalog, &record.active_sinner);
    record.sinner_shards = merge_count_map(stored.get("sinnerShards"), record.sinner_shards);
    record.sinner_targets = merge_count_map(stored.get("sinnerTargets"), record.sinner_targets);
    record.sinner_goals = merge_legacy_goals(stored.get("sinnerGoals"), record.sinner_goals);
    record.item_progress = merge_item_progress(stored.get("idEgoState"), empty_item_progress(catalog));
    record.runs_completed = merge_non_negative(stored.get("runsCompleted"), record.runs_completed);
    record.total_shards_gained =
        merge_non_negative(stored.get("totalShardsGained"), record.total_shards_gained);
    record.bonus_shards_total =
        merge_non_negative(stored.get("bonusShardsTotal"), record.bonus_shards_total);
    record.unopened_boxes = merge_non_negative(stored.get("unopenedBoxes"), record.unopened_boxes);
    record.history = merge_history(stored.get("history"));

    // Item goals introduced after a schema upgrade win over stale targets.
    if stored_has_goal(stored.get("idEgoState")) {
        recompute_all_targets(&mut record, catalog);
    }
    record
}

// ---------------------------------------------------------------------------
// Field merge rules
// ---------------------------------------------------------------------------

/// JavaScript-style truthiness, as written by the browser front-end.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Non-negative integer, flooring finite fractional numbers.
pub fn coerce_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_f64().and_then(floor_f64))
}

fn is_absent(value: Option<&Value>) -> bool {
    value.map_or(true, |v| !truthy(v))
}

pub fn merge_active_sinner(value: Option<&Value>, catalog: &Catalog, default: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(name) if catalog.is_sinner(name) => name.to_string(),
        Some(name) => {
            tracing::warn!(sinner = name, "stored active Sinner is not in the roster");
            default.to_string()
        }
        None => default.to_string(),
    }
}

/// Stored mapping wins wholesale; entries that are not counts are skipped.
pub fn merge_count_map(value: Option<&Value>, default: BTreeMap<String, u64>) -> BTreeMap<String, u64> {
    let Some(Value::Object(stored)) = value else {
        return default;
    };
    stored
        .iter()
        .filter_map(|(name, v)| coerce_count(v).map(|count| (name.clone(), count)))
        .collect()
}

pub fn merge_legacy_goals(
    value: Option<&Value>,
    default: BTreeMap<String, LegacyGoal>,
) -> BTreeMap<String, LegacyGoal> {
    let Some(Value::Object(stored)) = value else {
        return default;
    };
    stored
        .iter()
        .filter_map(|(name, v)| {
            let goal = v.as_object()?;
            let count = |key: &str| goal.get(key).and_then(coerce_count).unwrap_or(0);
            Some((
                name.clone(),
                LegacyGoal {
                    count_000: count("count000"),
                    count_00: count("count00"),
                },
            ))
        })
        .collect()
}

/// `owned` falls back to the older `own` field; `enabled` is only false when
/// stored as exactly `false`.
pub fn coerce_item_progress(value: &Value) -> ItemProgress {
    let field = |key: &str| value.get(key).filter(|v| !v.is_null());
    ItemProgress {
        owned: field("owned").or_else(|| field("own")).is_some_and(truthy),
        goal: field("goal").is_some_and(truthy),
        enabled: value.get("enabled") != Some(&Value::Bool(false)),
    }
}

/// Stored entries overwrite the defaults; entries for items no longer in the
/// catalog are kept.
pub fn merge_item_progress(value: Option<&Value>, mut base: ItemProgressMap) -> ItemProgressMap {
    let Some(Value::Object(stored)) = value else {
        return base;
    };
    for (sinner, items) in stored {
        let Some(items) = items.as_object() else {
            continue;
        };
        let entries = base.entry(SinnerId(sinner.clone())).or_default();
        for (item, state) in items {
            entries.insert(ItemId(item.clone()), coerce_item_progress(state));
        }
    }
    base
}

pub fn merge_non_negative(value: Option<&Value>, default: u64) -> u64 {
    value.and_then(coerce_count).unwrap_or(default)
}

/// Entries that do not deserialize are dropped; order is preserved.
pub fn merge_history(value: Option<&Value>) -> Vec<HistoryEntry> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!("dropping unreadable history entry: {err}");
                None
            }
        })
        .collect()
}

pub fn stored_has_goal(value: Option<&Value>) -> bool {
    let Some(Value::Object(stored)) = value else {
        return false;
    };
    stored
        .values()
        .filter_map(Value::as_object)
        .flat_map(|items| items.values())
        .any(|state| state.get("goal").is_some_and(truthy))
}
