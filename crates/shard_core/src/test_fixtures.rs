//! Shared test fixtures for shard_core and downstream crates.
//!
//! `base_catalog()` is a full 12-Sinner roster where every Sinner has a base
//! identity; Yi Sang and Faust carry extra purchasable IDs/EGOs so goal math
//! has something to sum. Constants match production content.

use std::collections::BTreeMap;

use crate::{Catalog, Constants, ItemDef, ItemId, ProgressRecord, Rarity, SinnerDef, SinnerId};

pub const ROSTER: [&str; 12] = [
    "Yi Sang",
    "Faust",
    "Don Quixote",
    "Ryōshū",
    "Meursault",
    "Hong Lu",
    "Heathcliff",
    "Ishmael",
    "Rodion",
    "Sinclair",
    "Outis",
    "Gregor",
];

pub fn base_constants() -> Constants {
    Constants {
        default_target_shards: 400,
        initial_shards_owned: 0,
        avg_shards_per_box: 2.0,
        boxes_per_run: 9,
        weekly_bonus_boxes: 63,
        cost_per_000: 400,
        cost_per_00: 150,
        modules_per_run: 5,
        default_active_sinner: "Yi Sang".to_string(),
    }
}

pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace('ō', "o")
        .replace('ū', "u")
        .replace(' ', "-")
}

fn item(slug: &str, suffix: &str, name: &str, rarity: Rarity) -> ItemDef {
    ItemDef {
        id: ItemId(format!("{slug}-{suffix}")),
        name: name.to_string(),
        rarity,
        img: format!("images/{slug}/{suffix}.webp"),
    }
}

pub fn base_catalog() -> Catalog {
    let sinners = ROSTER
        .iter()
        .map(|name| {
            let slug = slugify(name);
            let mut identities = vec![item(&slug, "lcb", &format!("LCB Sinner {name}"), Rarity::Base)];
            let mut egos = Vec::new();
            match *name {
                "Yi Sang" => {
                    identities.push(item(
                        &slug,
                        "south-section-6",
                        "Seven Association South Section 6 Yi Sang",
                        Rarity::TwoStar,
                    ));
                    identities.push(item(
                        &slug,
                        "blade-lineage",
                        "Blade Lineage Salsu Yi Sang",
                        Rarity::ThreeStar,
                    ));
                    egos.push(item(&slug, "crows-eye-view", "Crow's Eye View", Rarity::Base));
                    egos.push(item(&slug, "sunshower", "Sunshower", Rarity::Ego));
                }
                "Faust" => {
                    identities.push(item(
                        &slug,
                        "w-corp",
                        "W Corp. L2 Cleanup Agent Faust",
                        Rarity::TwoStar,
                    ));
                    identities.push(item(
                        &slug,
                        "wuthering-heights",
                        "Wuthering Heights Chief Butler Faust",
                        Rarity::ThreeStar,
                    ));
                }
                _ => {}
            }
            SinnerDef {
                id: SinnerId(slug),
                name: (*name).to_string(),
                identities,
                egos,
            }
        })
        .collect();

    Catalog {
        content_version: "test".to_string(),
        constants: base_constants(),
        rarity_costs: BTreeMap::from([
            (Rarity::TwoStar, 150),
            (Rarity::ThreeStar, 400),
            (Rarity::Ego, 400),
        ]),
        sinners,
    }
}

pub fn base_record(catalog: &Catalog) -> ProgressRecord {
    ProgressRecord::new(catalog)
}

/// Fixed clock for history timestamps.
pub fn fixed_now() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default()
}
