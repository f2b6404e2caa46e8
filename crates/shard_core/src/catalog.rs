//! Read-only lookups over the Sinner roster and their IDs/EGOs.

use crate::{Catalog, CatalogEntry, ItemDef, ItemKind, SinnerDef, SinnerId, ValidationError};

impl Catalog {
    /// Roster names in display order.
    pub fn sinner_names(&self) -> impl Iterator<Item = &str> {
        self.sinners.iter().map(|s| s.name.as_str())
    }

    pub fn is_sinner(&self, name: &str) -> bool {
        self.sinner(name).is_some()
    }

    pub fn sinner(&self, name: &str) -> Option<&SinnerDef> {
        self.sinners.iter().find(|s| s.name == name)
    }

    pub fn sinner_by_slug(&self, slug: &SinnerId) -> Option<&SinnerDef> {
        self.sinners.iter().find(|s| &s.id == slug)
    }

    pub fn slug_for(&self, name: &str) -> Option<&SinnerId> {
        self.sinner(name).map(|s| &s.id)
    }

    pub fn name_for(&self, slug: &SinnerId) -> Option<&str> {
        self.sinner_by_slug(slug).map(|s| s.name.as_str())
    }

    /// Accepts a display name or a slug, ignoring ASCII case.
    pub fn resolve_sinner(&self, input: &str) -> Option<&SinnerDef> {
        let input = input.trim();
        self.sinners
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(input) || s.id.0.eq_ignore_ascii_case(input))
    }

    /// The default active Sinner, falling back to the first roster entry when
    /// the configured name is not in the roster.
    pub fn default_active_sinner(&self) -> &str {
        let configured = self.constants.default_active_sinner.as_str();
        if self.is_sinner(configured) {
            configured
        } else {
            self.sinners.first().map_or(configured, |s| s.name.as_str())
        }
    }

    /// Identities first, then EGOs, in catalog order. Empty for unknown names.
    pub fn items_for(&self, name: &str) -> Vec<CatalogEntry<'_>> {
        self.sinner(name).map(entries_of).unwrap_or_default()
    }

    pub fn find_item(&self, name: &str, item_id: &str) -> Option<CatalogEntry<'_>> {
        self.items_for(name)
            .into_iter()
            .find(|entry| entry.item.id.0 == item_id)
    }

    /// Looks up an item or explains why it cannot be used.
    pub fn require_item(
        &self,
        name: &str,
        item_id: &str,
    ) -> Result<CatalogEntry<'_>, ValidationError> {
        if !self.is_sinner(name) {
            return Err(ValidationError::UnknownSinner(name.to_string()));
        }
        self.find_item(name, item_id)
            .ok_or_else(|| ValidationError::UnknownItem {
                sinner: name.to_string(),
                item: crate::ItemId(item_id.to_string()),
            })
    }

    pub fn cost_for(&self, item: &ItemDef) -> u64 {
        self.rarity_costs.get(&item.rarity).copied().unwrap_or(0)
    }

    /// First item, in roster order, whose name contains `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Result<CatalogEntry<'_>, ValidationError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(ValidationError::EmptySearch);
        }
        self.sinners
            .iter()
            .flat_map(entries_of)
            .find(|entry| entry.item.name.to_lowercase().contains(&query))
            .ok_or(ValidationError::NoSearchMatch)
    }

    /// "Base ID" for base identities, otherwise "000 ID · 400 shards".
    pub fn rarity_label(&self, entry: &CatalogEntry<'_>) -> String {
        if entry.item.rarity == crate::Rarity::Base {
            return "Base ID (0 shards)".to_string();
        }
        format!(
            "{} {} · {} shards",
            entry.item.rarity.label(),
            entry.kind.label(),
            self.cost_for(entry.item)
        )
    }
}

fn entries_of(sinner: &SinnerDef) -> Vec<CatalogEntry<'_>> {
    let identities = sinner.identities.iter().map(|item| CatalogEntry {
        sinner,
        item,
        kind: ItemKind::Identity,
    });
    let egos = sinner.egos.iter().map(|item| CatalogEntry {
        sinner,
        item,
        kind: ItemKind::Ego,
    });
    identities.chain(egos).collect()
}
