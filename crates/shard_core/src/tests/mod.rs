use super::*;
use crate::test_fixtures::{base_catalog, base_record, fixed_now};


// --- Shared test helpers ------------------------------------------------

fn test_catalog() -> Catalog {
    base_catalog()
}

fn test_record(catalog: &Catalog) -> ProgressRecord {
    base_record(catalog)
}

fn apply(record: &mut ProgressRecord, catalog: &Catalog, command: Command) -> CommandOutcome {
    apply_command(record, catalog, command, fixed_now()).expect("command should be valid")
}

fn item(id: &str) -> ItemId {
    ItemId(id.to_string())
}

fn goal_on(sinner: &str, id: &str) -> Command {
    Command::SetGoal {
        sinner: sinner.to_string(),
        item: item(id),
        goal: true,
    }
}

/// Yi Sang with both purchasable IDs as goals and 130 shards.
fn record_with_yi_sang_goals(catalog: &Catalog) -> ProgressRecord {
    let mut record = test_record(catalog);
    apply(&mut record, catalog, goal_on("Yi Sang", "yi-sang-blade-lineage"));
    apply(&mut record, catalog, goal_on("Yi Sang", "yi-sang-south-section-6"));
    record.sinner_shards.insert("Yi Sang".to_string(), 130);
    record
}
