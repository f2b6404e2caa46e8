//! Type definitions for `shard_core`.
//!
//! Catalog types are read-only content loaded once at startup. The
//! `ProgressRecord` is the single mutable record that gets persisted; its
//! serialized field names match the storage blob written by earlier releases.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// Stable slug of a Sinner, e.g. `yi-sang`.
string_id!(SinnerId);
string_id!(ItemId);

// ---------------------------------------------------------------------------
// Catalog enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// Starting identity; never purchasable, so it has no cost entry.
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "00")]
    TwoStar,
    #[serde(rename = "000")]
    ThreeStar,
    #[serde(rename = "EGO")]
    Ego,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Base => "base",
            Rarity::TwoStar => "00",
            Rarity::ThreeStar => "000",
            Rarity::Ego => "EGO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Identity,
    Ego,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Identity => "ID",
            ItemKind::Ego => "EGO",
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub content_version: String,
    pub constants: Constants,
    /// Rarities missing from this table cost 0 shards.
    pub rarity_costs: BTreeMap<Rarity, u64>,
    /// The fixed roster, in display order.
    pub sinners: Vec<SinnerDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinnerDef {
    pub id: SinnerId,
    pub name: String,
    #[serde(default)]
    pub identities: Vec<ItemDef>,
    #[serde(default)]
    pub egos: Vec<ItemDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub rarity: Rarity,
    /// Image reference; opaque to the tracker.
    #[serde(default)]
    pub img: String,
}

/// A catalog item together with the list it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    pub sinner: &'a SinnerDef,
    pub item: &'a ItemDef,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    /// Target used for a Sinner with no stored target entry.
    pub default_target_shards: u64,
    /// Starting shard count of the default active Sinner.
    pub initial_shards_owned: u64,
    /// Average shards per opened box (boxes yield 1–3).
    pub avg_shards_per_box: f64,
    pub boxes_per_run: u64,
    pub weekly_bonus_boxes: u64,
    pub cost_per_000: u64,
    pub cost_per_00: u64,
    pub modules_per_run: u64,
    pub default_active_sinner: String,
}

impl Constants {
    pub fn expected_shards_per_run(&self) -> f64 {
        self.avg_shards_per_box * self.boxes_per_run as f64
    }
}

// ---------------------------------------------------------------------------
// Progress state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    pub owned: bool,
    pub goal: bool,
    /// Whether a goal counts toward the Sinner's target.
    pub enabled: bool,
}

impl Default for ItemProgress {
    fn default() -> Self {
        Self {
            owned: false,
            goal: false,
            enabled: true,
        }
    }
}

/// Count-based goal kept for Sinners that have no item-level goals yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyGoal {
    #[serde(rename = "count000")]
    pub count_000: u64,
    #[serde(rename = "count00")]
    pub count_00: u64,
}

impl Default for LegacyGoal {
    fn default() -> Self {
        Self {
            count_000: 1,
            count_00: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub run_number: u64,
    pub shards_gained: u64,
    /// Empty for runs logged before per-Sinner tracking.
    #[serde(default)]
    pub sinner: String,
    pub timestamp: DateTime<Utc>,
}

pub type ItemProgressMap = BTreeMap<SinnerId, BTreeMap<ItemId, ItemProgress>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub active_sinner: String,
    pub sinner_shards: BTreeMap<String, u64>,
    pub sinner_targets: BTreeMap<String, u64>,
    pub sinner_goals: BTreeMap<String, LegacyGoal>,
    #[serde(rename = "idEgoState")]
    pub item_progress: ItemProgressMap,
    pub runs_completed: u64,
    /// Shards from logged runs only; bonuses are tracked separately.
    pub total_shards_gained: u64,
    pub bonus_shards_total: u64,
    /// Informational; never folded into shard counts.
    pub unopened_boxes: u64,
    /// Append-only run log.
    pub history: Vec<HistoryEntry>,
}
