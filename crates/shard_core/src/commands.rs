//! User-triggered state transitions.
//!
//! Each command is validated in full before anything is touched, so a
//! command either commits completely or leaves the record as it was.
//! Destructive commands go through `propose` first; the caller shows the
//! description, obtains confirmation, then calls `commit`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::goals::{has_any_goal, legacy_target, recompute_all_targets, recompute_target};
use crate::{Catalog, HistoryEntry, ItemId, LegacyGoal, ProgressRecord, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Log one MD run for the active Sinner.
    LogRun { amount: u64 },
    /// Log a lump-sum bonus for the active Sinner.
    LogBonus { amount: u64 },
    /// Overwrite raw shard counts for the listed Sinners.
    SetShards { shards: BTreeMap<String, u64> },
    SetLegacyGoal {
        sinner: String,
        count_000: u64,
        count_00: u64,
    },
    SetOwned {
        sinner: String,
        item: ItemId,
        owned: bool,
    },
    SetGoal {
        sinner: String,
        item: ItemId,
        goal: bool,
    },
    SetEnabled {
        sinner: String,
        item: ItemId,
        enabled: bool,
    },
    /// "Got it": owned, no longer a goal, cost deducted from the Sinner.
    MarkObtained { sinner: String, item: ItemId },
    SetStash { count: u64 },
    SwitchSinner { name: String },
    Reset,
}

impl Command {
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Command::MarkObtained { .. } | Command::Reset)
    }
}

/// What a committed command did, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CommandOutcome {
    RunLogged { run_number: u64, shards: u64, sinner: String },
    BonusLogged { shards: u64, sinner: String },
    ShardsUpdated { sinners: Vec<String> },
    TargetChanged { sinner: String, target: u64 },
    ItemUpdated { sinner: String, item: ItemId },
    ItemObtained { sinner: String, item: ItemId, cost: u64, shards_left: u64 },
    StashUpdated { count: u64 },
    SinnerSwitched { name: String },
    Reset,
}

/// A validated command waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub command: Command,
    pub description: String,
    pub requires_confirmation: bool,
}

/// Checks every precondition of `command` against the current record.
pub fn validate_command(
    record: &ProgressRecord,
    catalog: &Catalog,
    command: &Command,
) -> Result<(), ValidationError> {
    match command {
        Command::SetStash { .. } | Command::Reset => Ok(()),
        Command::LogRun { amount } => {
            fits(record.runs_completed.checked_add(1), "the run count")?;
            fits(
                record.total_shards_gained.checked_add(*amount),
                "the total shards gained",
            )?;
            fits(active_shards(record).checked_add(*amount), "the shard count")
        }
        Command::LogBonus { amount } => {
            fits(
                record.bonus_shards_total.checked_add(*amount),
                "the bonus shard total",
            )?;
            fits(active_shards(record).checked_add(*amount), "the shard count")
        }
        Command::SetShards { shards } => shards
            .keys()
            .find(|name| !catalog.is_sinner(name))
            .map_or(Ok(()), |name| Err(ValidationError::UnknownSinner(name.clone()))),
        Command::SetLegacyGoal {
            sinner,
            count_000,
            count_00,
        } => {
            require_sinner(catalog, sinner)?;
            let goal = LegacyGoal {
                count_000: *count_000,
                count_00: *count_00,
            };
            fits(legacy_target(&goal, &catalog.constants), "the shard target")
        }
        Command::SwitchSinner { name } => require_sinner(catalog, name),
        Command::SetOwned { sinner, item, .. } | Command::SetGoal { sinner, item, .. } => {
            catalog.require_item(sinner, &item.0).map(|_| ())
        }
        Command::SetEnabled { sinner, item, .. } | Command::MarkObtained { sinner, item } => {
            let entry = catalog.require_item(sinner, &item.0)?;
            if record.item_state(&entry.sinner.id, item).goal {
                Ok(())
            } else {
                Err(ValidationError::NotAGoal {
                    sinner: sinner.clone(),
                    item: item.clone(),
                })
            }
        }
    }
}

/// Validates `command` and describes what committing it would do.
pub fn propose(
    record: &ProgressRecord,
    catalog: &Catalog,
    command: Command,
) -> Result<Proposal, ValidationError> {
    validate_command(record, catalog, &command)?;
    let description = describe(record, catalog, &command);
    Ok(Proposal {
        requires_confirmation: command.requires_confirmation(),
        command,
        description,
    })
}

/// Applies a previously proposed command. Preconditions are re-checked since
/// the record may have changed between proposal and confirmation.
pub fn commit(
    record: &mut ProgressRecord,
    catalog: &Catalog,
    proposal: Proposal,
    now: DateTime<Utc>,
) -> Result<CommandOutcome, ValidationError> {
    apply_command(record, catalog, proposal.command, now)
}

pub fn apply_command(
    record: &mut ProgressRecord,
    catalog: &Catalog,
    command: Command,
    now: DateTime<Utc>,
) -> Result<CommandOutcome, ValidationError> {
    validate_command(record, catalog, &command)?;
    tracing::debug!(?command, "applying command");

    let outcome = match command {
        Command::LogRun { amount } => log_run(record, amount, now),
        Command::LogBonus { amount } => {
            let sinner = record.active_sinner.clone();
            record.bonus_shards_total = record.bonus_shards_total.saturating_add(amount);
            credit(record, &sinner, amount);
            CommandOutcome::BonusLogged {
                shards: amount,
                sinner,
            }
        }
        Command::SetShards { shards } => {
            let sinners = shards.keys().cloned().collect();
            record.sinner_shards.extend(shards);
            CommandOutcome::ShardsUpdated { sinners }
        }
        Command::SetLegacyGoal {
            sinner,
            count_000,
            count_00,
        } => set_legacy_goal(
            record,
            catalog,
            sinner,
            LegacyGoal {
                count_000,
                count_00,
            },
        ),
        Command::SetOwned {
            sinner,
            item,
            owned,
        } => {
            let slug = sinner_slug(catalog, &sinner);
            record.item_state_mut(&slug, &item).owned = owned;
            CommandOutcome::ItemUpdated { sinner, item }
        }
        Command::SetGoal { sinner, item, goal } => {
            let slug = sinner_slug(catalog, &sinner);
            record.item_state_mut(&slug, &item).goal = goal;
            recompute_all_targets(record, catalog);
            CommandOutcome::ItemUpdated { sinner, item }
        }
        Command::SetEnabled {
            sinner,
            item,
            enabled,
        } => {
            let slug = sinner_slug(catalog, &sinner);
            record.item_state_mut(&slug, &item).enabled = enabled;
            recompute_all_targets(record, catalog);
            CommandOutcome::ItemUpdated { sinner, item }
        }
        Command::MarkObtained { sinner, item } => mark_obtained(record, catalog, sinner, item),
        Command::SetStash { count } => {
            record.unopened_boxes = count;
            CommandOutcome::StashUpdated { count }
        }
        Command::SwitchSinner { name } => {
            record.active_sinner.clone_from(&name);
            CommandOutcome::SinnerSwitched { name }
        }
        Command::Reset => {
            *record = ProgressRecord::new(catalog);
            CommandOutcome::Reset
        }
    };
    Ok(outcome)
}

fn log_run(record: &mut ProgressRecord, amount: u64, now: DateTime<Utc>) -> CommandOutcome {
    let sinner = record.active_sinner.clone();
    record.runs_completed = record.runs_completed.saturating_add(1);
    record.total_shards_gained = record.total_shards_gained.saturating_add(amount);
    credit(record, &sinner, amount);
    record.history.push(HistoryEntry {
        run_number: record.runs_completed,
        shards_gained: amount,
        sinner: sinner.clone(),
        timestamp: now,
    });
    CommandOutcome::RunLogged {
        run_number: record.runs_completed,
        shards: amount,
        sinner,
    }
}

fn set_legacy_goal(
    record: &mut ProgressRecord,
    catalog: &Catalog,
    sinner: String,
    goal: LegacyGoal,
) -> CommandOutcome {
    record.sinner_goals.insert(sinner.clone(), goal);
    // Item-level goals, once present anywhere, own every target.
    if has_any_goal(record) {
        recompute_target(record, catalog, &sinner);
    } else {
        let target = legacy_target(&goal, &catalog.constants).unwrap_or(u64::MAX);
        record.sinner_targets.insert(sinner.clone(), target);
    }
    let target = record.target_for(&sinner, catalog);
    CommandOutcome::TargetChanged { sinner, target }
}

fn mark_obtained(
    record: &mut ProgressRecord,
    catalog: &Catalog,
    sinner: String,
    item: ItemId,
) -> CommandOutcome {
    let slug = sinner_slug(catalog, &sinner);
    let cost = item_cost(catalog, &sinner, &item);

    let state = record.item_state_mut(&slug, &item);
    state.owned = true;
    state.goal = false;
    state.enabled = true;

    let shards_left = record.shards_for(&sinner).saturating_sub(cost);
    record.sinner_shards.insert(sinner.clone(), shards_left);
    recompute_all_targets(record, catalog);
    CommandOutcome::ItemObtained {
        sinner,
        item,
        cost,
        shards_left,
    }
}

fn item_cost(catalog: &Catalog, sinner: &str, item: &ItemId) -> u64 {
    catalog
        .find_item(sinner, &item.0)
        .map_or(0, |entry| catalog.cost_for(entry.item))
}

// Counter updates below saturate, but validation has already rejected any
// amount that would not fit.
fn credit(record: &mut ProgressRecord, sinner: &str, amount: u64) {
    let shards = record.sinner_shards.entry(sinner.to_string()).or_insert(0);
    *shards = shards.saturating_add(amount);
}

fn active_shards(record: &ProgressRecord) -> u64 {
    record.shards_for(&record.active_sinner)
}

fn fits(value: Option<u64>, counter: &'static str) -> Result<(), ValidationError> {
    value
        .map(|_| ())
        .ok_or(ValidationError::AmountTooLarge { counter })
}

fn require_sinner(catalog: &Catalog, name: &str) -> Result<(), ValidationError> {
    if catalog.is_sinner(name) {
        Ok(())
    } else {
        Err(ValidationError::UnknownSinner(name.to_string()))
    }
}

// Only called after validation, so the Sinner is known.
fn sinner_slug(catalog: &Catalog, name: &str) -> crate::SinnerId {
    catalog
        .slug_for(name)
        .cloned()
        .unwrap_or_else(|| crate::SinnerId(name.to_string()))
}

fn describe(record: &ProgressRecord, catalog: &Catalog, command: &Command) -> String {
    let item_name = |sinner: &str, item: &ItemId| {
        catalog
            .find_item(sinner, &item.0)
            .map_or_else(|| item.0.clone(), |entry| entry.item.name.clone())
    };
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    match command {
        Command::LogRun { amount } => {
            format!("Log a run of {amount} shards for {}.", record.active_sinner)
        }
        Command::LogBonus { amount } => {
            format!("Add a bonus of {amount} shards to {}.", record.active_sinner)
        }
        Command::SetShards { shards } => {
            let parts: Vec<String> = shards
                .iter()
                .map(|(name, amount)| format!("{name} = {amount}"))
                .collect();
            format!("Set shard counts: {}.", parts.join(", "))
        }
        Command::SetLegacyGoal {
            sinner,
            count_000,
            count_00,
        } => format!("Set {sinner}'s goal to {count_000}× 000 and {count_00}× 00."),
        Command::SetOwned {
            sinner,
            item,
            owned,
        } => format!("Turn Own {} for \"{}\".", on_off(*owned), item_name(sinner, item)),
        Command::SetGoal { sinner, item, goal } => {
            format!("Turn Goal {} for \"{}\".", on_off(*goal), item_name(sinner, item))
        }
        Command::SetEnabled {
            sinner,
            item,
            enabled,
        } => format!(
            "Turn Include {} for \"{}\".",
            on_off(*enabled),
            item_name(sinner, item)
        ),
        Command::MarkObtained { sinner, item } => {
            let cost = item_cost(catalog, sinner, item);
            format!(
                "Mark \"{}\" as obtained for {sinner}? This will mark it as Owned, remove it \
                 from your goals, and subtract {cost} shards from {sinner}'s shard total.",
                item_name(sinner, item)
            )
        }
        Command::SetStash { count } => format!("Set unopened boxes to {count}."),
        Command::SwitchSinner { name } => format!("Track {name}."),
        Command::Reset => {
            "Reset all progression and start again from the default record?".to_string()
        }
    }
}
