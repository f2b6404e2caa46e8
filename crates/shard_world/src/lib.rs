//! Catalog loading and on-disk persistence shared by the shard front-ends.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shard_core::{Catalog, Constants, Persistence, Rarity, SinnerDef};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Number of Sinners on the roster.
pub const ROSTER_SIZE: usize = 12;

#[derive(Deserialize)]
struct SinnersFile {
    content_version: String,
    sinners: Vec<SinnerDef>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let raw = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {file}"))
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like: a roster that is not exactly twelve Sinners, two
/// items sharing an id under one Sinner, or a default active Sinner that is
/// not on the roster.
pub fn validate_content(catalog: &Catalog) {
    assert_eq!(
        catalog.sinners.len(),
        ROSTER_SIZE,
        "roster must have exactly {ROSTER_SIZE} Sinners",
    );

    let mut names = HashSet::new();
    let mut slugs = HashSet::new();
    for sinner in &catalog.sinners {
        assert!(!sinner.name.is_empty(), "Sinner has empty name");
        assert!(!sinner.id.0.is_empty(), "Sinner '{}' has empty slug", sinner.name);
        assert!(
            names.insert(sinner.name.as_str()),
            "duplicate Sinner name '{}'",
            sinner.name,
        );
        assert!(
            slugs.insert(sinner.id.0.as_str()),
            "duplicate Sinner slug '{}'",
            sinner.id,
        );

        let mut item_ids = HashSet::new();
        for item in sinner.identities.iter().chain(&sinner.egos) {
            assert!(
                !item.id.0.is_empty(),
                "Sinner '{}' has an item with empty id",
                sinner.name,
            );
            assert!(
                item_ids.insert(item.id.0.as_str()),
                "Sinner '{}' has duplicate item id '{}'",
                sinner.name,
                item.id,
            );
        }
    }

    let c = &catalog.constants;
    assert!(
        names.contains(c.default_active_sinner.as_str()),
        "default active Sinner '{}' is not on the roster",
        c.default_active_sinner,
    );
    assert!(
        c.avg_shards_per_box > 0.0,
        "avg_shards_per_box must be positive, got {}",
        c.avg_shards_per_box,
    );
    assert!(c.boxes_per_run > 0, "boxes_per_run must be positive");
}

pub fn load_content(content_dir: &str) -> Result<Catalog> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let rarity_costs: BTreeMap<Rarity, u64> = read_json(dir, "rarity_costs.json")?;
    let sinners_file: SinnersFile = read_json(dir, "sinners.json")?;
    let catalog = Catalog {
        content_version: sinners_file.content_version,
        constants,
        rarity_costs,
        sinners: sinners_file.sinners,
    };
    validate_content(&catalog);
    tracing::debug!(
        version = %catalog.content_version,
        sinners = catalog.sinners.len(),
        "loaded content"
    );
    Ok(catalog)
}

/// Directory-backed store: each key lives in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Persistence for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating save directory {}", self.dir.display()))?;
        let path = self.path_for(key);
        std::fs::write(&path, blob).with_context(|| format!("writing {}", path.display()))
    }
}
