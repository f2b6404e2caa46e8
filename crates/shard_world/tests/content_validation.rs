//! Validation tests for the production `content/*.json` catalog.
//!
//! These load the real files and check:
//! 1. Schema validity: every file deserializes
//! 2. Roster shape and item ids
//! 3. Constants and rarity costs the projections depend on

use shard_core::{Catalog, ItemKind, Rarity};
use shard_world::load_content;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Integration tests run from the crate directory, so go up two levels.
fn content_dir() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content")
}

fn load_test_content() -> &'static Catalog {
    static CONTENT: OnceLock<Catalog> = OnceLock::new();
    CONTENT.get_or_init(|| {
        load_content(&content_dir()).expect("load_content should succeed for production content")
    })
}

#[test]
fn content_loads_successfully() {
    let catalog = load_test_content();
    assert!(!catalog.content_version.is_empty());
}

#[test]
fn roster_order_starts_with_default_sinner() {
    let catalog = load_test_content();
    let names: Vec<&str> = catalog.sinner_names().collect();
    assert_eq!(names.len(), 12);
    assert_eq!(names[0], "Yi Sang");
    assert_eq!(names[11], "Gregor");
    assert_eq!(catalog.default_active_sinner(), "Yi Sang");
}

#[test]
fn every_sinner_has_exactly_one_base_identity() {
    let catalog = load_test_content();
    for sinner in &catalog.sinners {
        let base = sinner
            .identities
            .iter()
            .filter(|item| item.rarity == Rarity::Base)
            .count();
        assert_eq!(base, 1, "'{}' should have one base identity", sinner.name);
    }
}

#[test]
fn item_ids_are_prefixed_with_sinner_slug() {
    let catalog = load_test_content();
    for sinner in &catalog.sinners {
        for entry in catalog.items_for(&sinner.name) {
            assert!(
                entry.item.id.0.starts_with(&sinner.id.0),
                "item '{}' is filed under '{}'",
                entry.item.id,
                sinner.name,
            );
        }
    }
}

#[test]
fn item_ids_are_unique_across_roster() {
    let catalog = load_test_content();
    let mut seen = HashSet::new();
    for sinner in &catalog.sinners {
        for entry in catalog.items_for(&sinner.name) {
            assert!(
                seen.insert(entry.item.id.clone()),
                "item id '{}' appears twice",
                entry.item.id
            );
        }
    }
}

#[test]
fn identities_are_never_ego_rarity() {
    let catalog = load_test_content();
    for sinner in &catalog.sinners {
        for entry in catalog.items_for(&sinner.name) {
            if entry.kind == ItemKind::Identity {
                assert_ne!(entry.item.rarity, Rarity::Ego, "'{}'", entry.item.name);
            }
        }
    }
}

#[test]
fn rarity_costs_match_production_prices() {
    let catalog = load_test_content();
    assert_eq!(catalog.rarity_costs.get(&Rarity::TwoStar), Some(&150));
    assert_eq!(catalog.rarity_costs.get(&Rarity::ThreeStar), Some(&400));
    assert_eq!(catalog.rarity_costs.get(&Rarity::Ego), Some(&400));
    assert!(!catalog.rarity_costs.contains_key(&Rarity::Base));
}

#[test]
fn constants_give_eighteen_shards_per_run() {
    let c = &load_test_content().constants;
    assert_eq!(c.boxes_per_run, 9);
    assert_eq!(c.modules_per_run, 5);
    assert_eq!(c.default_target_shards, 400);
    assert_eq!(c.cost_per_000, 400);
    assert_eq!(c.cost_per_00, 150);
    assert!((c.expected_shards_per_run() - 18.0).abs() < f64::EPSILON);
}

#[test]
fn search_finds_items_by_partial_name() {
    let catalog = load_test_content();
    let hit = catalog.search("blade lineage").expect("should match");
    assert_eq!(hit.sinner.name, "Yi Sang");
    assert_eq!(hit.item.rarity, Rarity::ThreeStar);
    assert!(catalog.search("no such identity").is_err());
}
