//! Plain-text views printed to stdout.

use shard_core::projection::{fmt_fixed, fmt_optional};
use shard_core::{
    Catalog, CatalogEntry, CommandOutcome, GoalItem, HistoryEntry, ItemKind, ItemProgress,
    OverviewRow, ProgressRecord, Projection,
};

const TARGET_REACHED: &str = "0 (target reached)";

pub fn status(p: &Projection) -> String {
    let (runs_left, runs_rounded, modules) = if p.remaining == 0 {
        (TARGET_REACHED.to_string(), "0".to_string(), "0".to_string())
    } else {
        (
            fmt_fixed(p.runs_left_theoretical, 2),
            p.runs_left_theoretical_ceil.to_string(),
            p.modules_needed.to_string(),
        )
    };
    [
        format!("Tracking: {}", p.sinner),
        format!("Shards: {} / {} (remaining {})", p.current, p.target, p.remaining),
        format!("Runs completed: {}", p.runs_completed),
        format!("Bonus shards logged: {}", p.bonus_shards_total),
        String::new(),
        format!(
            "Theoretical ({} shards per run)",
            fmt_fixed(p.expected_shards_per_run, 1)
        ),
        format!("  Runs left:       {runs_left}"),
        format!("  Runs (rounded):  {runs_rounded}"),
        format!("  Modules needed:  {modules}"),
        format!("  Boxes needed:    {}", fmt_fixed(p.boxes_needed_avg, 1)),
        String::new(),
        "From your runs".to_string(),
        format!(
            "  Average per run: {}",
            fmt_optional(p.actual_average_per_run, 2)
        ),
        format!("  Runs left:       {}", p.runs_left_actual.display()),
        String::new(),
        format!(
            "Stash: {} unopened boxes ≈ {} shards",
            p.unopened_boxes,
            fmt_fixed(p.stash_expected_shards, 0)
        ),
        format!(
            "Weekly bonus: ≈ {} shards",
            fmt_fixed(p.weekly_bonus_expected, 0)
        ),
    ]
    .join("\n")
}

pub fn overview(rows: &[OverviewRow]) -> String {
    let width = rows.iter().map(|r| r.sinner.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|row| {
            let pad = width - row.sinner.chars().count();
            let (remaining, runs, boxes) = if row.remaining == 0 {
                ("0 (done)".to_string(), "0".to_string(), "0".to_string())
            } else {
                (
                    row.remaining.to_string(),
                    fmt_fixed(row.runs_left_avg, 2),
                    fmt_fixed(row.boxes_needed_avg, 1),
                )
            };
            format!(
                "{}{:pad$}  Shards: {} / {}  Remaining: {remaining}  Runs left (avg): {runs}  Boxes needed (avg): {boxes}",
                row.sinner, "", row.current, row.target,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn history<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> String {
    let lines: Vec<String> = entries
        .into_iter()
        .map(|entry| {
            let sinner = if entry.sinner.is_empty() {
                String::new()
            } else {
                format!(" – {}", entry.sinner)
            };
            format!(
                "Run #{}: +{} shards{sinner} ({})",
                entry.run_number,
                entry.shards_gained,
                entry.timestamp.format("%d %b %H:%M"),
            )
        })
        .collect();
    if lines.is_empty() {
        "No runs logged yet.".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn goals(sinner: &str, items: &[GoalItem], target: u64) -> String {
    if items.is_empty() {
        return format!("{sinner}: No specific IDs/EGOs selected for this Sinner yet.");
    }
    let header = format!("Tracked IDs & EGOs for {sinner} (target {target} shards)");
    std::iter::once(header)
        .chain(items.iter().map(|item| {
            let mark = if item.enabled { "[x]" } else { "[ ]" };
            format!("  {mark} {}  {}  ({})", item.name, item.label, item.id)
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

fn flags(state: ItemProgress) -> String {
    let mut parts = Vec::new();
    if state.owned {
        parts.push("owned");
    }
    if state.goal {
        parts.push(if state.enabled { "goal" } else { "goal (excluded)" });
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("  [{}]", parts.join(", "))
    }
}

fn item_line(catalog: &Catalog, record: &ProgressRecord, entry: &CatalogEntry<'_>) -> String {
    let state = record.item_state(&entry.sinner.id, &entry.item.id);
    format!(
        "  {}  {}  ({}){}",
        entry.item.name,
        catalog.rarity_label(entry),
        entry.item.id,
        flags(state)
    )
}

/// Every ID and EGO of one Sinner with its owned/goal flags.
pub fn items(catalog: &Catalog, record: &ProgressRecord, sinner: &str) -> String {
    let entries = catalog.items_for(sinner);
    let mut lines = vec![sinner.to_string()];
    for (kind, heading) in [(ItemKind::Identity, "Identities"), (ItemKind::Ego, "EGOs")] {
        let group: Vec<String> = entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| item_line(catalog, record, entry))
            .collect();
        if group.is_empty() {
            continue;
        }
        lines.push(heading.to_string());
        lines.extend(group);
    }
    lines.join("\n")
}

pub fn search_hit(catalog: &Catalog, record: &ProgressRecord, entry: &CatalogEntry<'_>) -> String {
    format!(
        "Found under {}:\n{}",
        entry.sinner.name,
        item_line(catalog, record, entry)
    )
}

pub fn outcome(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::RunLogged {
            run_number,
            shards,
            sinner,
        } => format!("Logged run #{run_number}: +{shards} shards for {sinner}."),
        CommandOutcome::BonusLogged { shards, sinner } => {
            format!("Added {shards} bonus shards to {sinner}.")
        }
        CommandOutcome::ShardsUpdated { sinners } => {
            format!("Updated shard counts for {}.", sinners.join(", "))
        }
        CommandOutcome::TargetChanged { sinner, target } => {
            format!("{sinner}'s target is now {target} shards.")
        }
        CommandOutcome::ItemUpdated { sinner, item } => format!("Updated {item} for {sinner}."),
        CommandOutcome::ItemObtained {
            sinner,
            item,
            cost,
            shards_left,
        } => format!(
            "Marked {item} as obtained. Spent {cost} shards; {sinner} has {shards_left} left."
        ),
        CommandOutcome::StashUpdated { count } => format!("Unopened boxes set to {count}."),
        CommandOutcome::SinnerSwitched { name } => format!("Now tracking {name}."),
        CommandOutcome::Reset => "Progress reset to the starting record.".to_string(),
    }
}
