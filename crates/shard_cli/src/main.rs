use std::collections::BTreeMap;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shard_core::{
    parse_amount, parse_shard_field, Catalog, Command, ItemId, Persistence, Tracker,
    ValidationError,
};
use shard_world::{load_content, FileStore};

mod render;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "shard_cli", about = "Mirror Dungeon shard tracker")]
struct Cli {
    #[arg(long, global = true, default_value = "./content")]
    content_dir: String,
    /// Directory holding the saved progress file.
    #[arg(long, global = true, default_value = "./saves")]
    save_dir: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shards, target and projections for one Sinner (default: the tracked one).
    Status {
        #[arg(long)]
        sinner: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// One line per Sinner.
    Overview {
        #[arg(long)]
        json: bool,
    },
    /// Logged runs, newest first.
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Goal IDs & EGOs of a Sinner (default: the tracked one).
    Goals { sinner: Option<String> },
    /// Every ID and EGO of a Sinner.
    Items { sinner: String },
    /// First ID or EGO whose name contains the query.
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Log the shards from one MD run for the tracked Sinner.
    LogRun {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Add a lump-sum bonus for the tracked Sinner.
    Bonus {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Overwrite shard counts, e.g. `set-shards "Yi Sang=130" faust=40`.
    SetShards {
        #[arg(required = true, value_parser = parse_shard_entry)]
        entries: Vec<(String, String)>,
    },
    /// Count-based goal, used while no item-level goals exist.
    SetLegacyGoal {
        sinner: String,
        #[arg(allow_hyphen_values = true)]
        count_000: String,
        #[arg(allow_hyphen_values = true)]
        count_00: String,
    },
    Own {
        sinner: String,
        item: String,
        #[arg(long)]
        off: bool,
    },
    Goal {
        sinner: String,
        item: String,
        #[arg(long)]
        off: bool,
    },
    /// Count a goal toward the target (`--off` keeps it listed but excluded).
    Include {
        sinner: String,
        item: String,
        #[arg(long)]
        off: bool,
    },
    /// Mark a goal as obtained and spend its cost.
    GotIt {
        sinner: String,
        item: String,
        #[arg(long)]
        yes: bool,
    },
    /// Record the number of unopened boxes.
    Stash {
        #[arg(allow_hyphen_values = true)]
        count: String,
    },
    /// Change the tracked Sinner.
    Switch { sinner: String },
    /// Discard all progress.
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

fn parse_shard_entry(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, amount)| (name.trim().to_string(), amount.to_string()))
        .ok_or_else(|| format!("expected NAME=AMOUNT, got '{raw}'"))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

enum Step {
    Print(String),
    Apply { command: Command, confirmed: bool },
}

impl From<Command> for Step {
    fn from(command: Command) -> Self {
        Step::Apply {
            command,
            confirmed: false,
        }
    }
}

fn sinner_name(catalog: &Catalog, input: &str) -> Result<String, ValidationError> {
    catalog
        .resolve_sinner(input)
        .map(|sinner| sinner.name.clone())
        .ok_or_else(|| ValidationError::UnknownSinner(input.to_string()))
}

fn shard_entries(
    catalog: &Catalog,
    entries: &[(String, String)],
) -> Result<BTreeMap<String, u64>, ValidationError> {
    entries
        .iter()
        .map(|(input, raw)| {
            let name = sinner_name(catalog, input)?;
            let amount = parse_shard_field(&name, raw)?;
            Ok((name, amount))
        })
        .collect()
}

fn status_view<P: Persistence>(
    tracker: &Tracker<P>,
    sinner: Option<String>,
    json: bool,
) -> Result<String> {
    let projection = match sinner {
        Some(input) => tracker.projection_for(&sinner_name(tracker.catalog(), &input)?),
        None => tracker.projection(),
    };
    if json {
        Ok(serde_json::to_string_pretty(&projection)?)
    } else {
        Ok(render::status(&projection))
    }
}

fn goals_view<P: Persistence>(tracker: &Tracker<P>, sinner: Option<String>) -> Result<String> {
    let catalog = tracker.catalog();
    let name = match sinner {
        Some(input) => sinner_name(catalog, &input)?,
        None => tracker.record().active_sinner.clone(),
    };
    let target = tracker.record().target_for(&name, catalog);
    Ok(render::goals(&name, &tracker.goal_items(&name), target))
}

/// Turns a subcommand into either rendered output or a command to apply.
fn plan<P: Persistence>(tracker: &Tracker<P>, command: Commands) -> Result<Step> {
    let catalog = tracker.catalog();
    let record = tracker.record();
    let step = match command {
        Commands::Status { sinner, json } => Step::Print(status_view(tracker, sinner, json)?),
        Commands::Overview { json } => {
            let rows = tracker.overview();
            Step::Print(if json {
                serde_json::to_string_pretty(&rows)?
            } else {
                render::overview(&rows)
            })
        }
        Commands::History { limit } => Step::Print(render::history(
            tracker.history_newest_first().take(limit.unwrap_or(usize::MAX)),
        )),
        Commands::Goals { sinner } => Step::Print(goals_view(tracker, sinner)?),
        Commands::Items { sinner } => {
            Step::Print(render::items(catalog, record, &sinner_name(catalog, &sinner)?))
        }
        Commands::Search { query } => {
            let entry = catalog.search(&query.join(" "))?;
            Step::Print(render::search_hit(catalog, record, &entry))
        }
        Commands::LogRun { amount } => Command::LogRun {
            amount: parse_amount(&amount, "shards")?,
        }
        .into(),
        Commands::Bonus { amount } => Command::LogBonus {
            amount: parse_amount(&amount, "shards")?,
        }
        .into(),
        Commands::SetShards { entries } => Command::SetShards {
            shards: shard_entries(catalog, &entries)?,
        }
        .into(),
        Commands::SetLegacyGoal {
            sinner,
            count_000,
            count_00,
        } => Command::SetLegacyGoal {
            sinner: sinner_name(catalog, &sinner)?,
            count_000: parse_amount(&count_000, "000 IDs")?,
            count_00: parse_amount(&count_00, "00 IDs")?,
        }
        .into(),
        Commands::Own { sinner, item, off } => Command::SetOwned {
            sinner: sinner_name(catalog, &sinner)?,
            item: ItemId(item),
            owned: !off,
        }
        .into(),
        Commands::Goal { sinner, item, off } => Command::SetGoal {
            sinner: sinner_name(catalog, &sinner)?,
            item: ItemId(item),
            goal: !off,
        }
        .into(),
        Commands::Include { sinner, item, off } => Command::SetEnabled {
            sinner: sinner_name(catalog, &sinner)?,
            item: ItemId(item),
            enabled: !off,
        }
        .into(),
        Commands::GotIt { sinner, item, yes } => Step::Apply {
            command: Command::MarkObtained {
                sinner: sinner_name(catalog, &sinner)?,
                item: ItemId(item),
            },
            confirmed: yes,
        },
        Commands::Stash { count } => Command::SetStash {
            count: parse_amount(&count, "boxes")?,
        }
        .into(),
        Commands::Switch { sinner } => Command::SwitchSinner {
            name: sinner_name(catalog, &sinner)?,
        }
        .into(),
        Commands::Reset { yes } => Step::Apply {
            command: Command::Reset,
            confirmed: yes,
        },
    };
    Ok(step)
}

fn run<P: Persistence>(tracker: &mut Tracker<P>, command: Commands) -> Result<String> {
    let (command, confirmed) = match plan(tracker, command)? {
        Step::Print(output) => return Ok(output),
        Step::Apply { command, confirmed } => (command, confirmed),
    };

    let proposal = tracker.propose(command)?;
    if proposal.requires_confirmation && !confirmed {
        tracing::debug!(command = ?proposal.command, "confirmation withheld, nothing applied");
        return Ok(format!(
            "{}\nNothing changed. Re-run with --yes to confirm.",
            proposal.description
        ));
    }
    let outcome = tracker.commit(proposal, chrono::Utc::now())?;
    Ok(format!(
        "{}\n\n{}",
        render::outcome(&outcome),
        render::status(&tracker.projection())
    ))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(
        content_dir = %cli.content_dir,
        save_dir = %cli.save_dir,
        "opening tracker"
    );
    let catalog = load_content(&cli.content_dir)?;
    let mut tracker = Tracker::open(catalog, FileStore::new(&cli.save_dir));

    match run(&mut tracker, cli.command) {
        Ok(output) => {
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match err.downcast_ref::<ValidationError>() {
            Some(validation) => {
                eprintln!("{validation}");
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use shard_core::test_fixtures::base_catalog;
    use shard_core::{MemoryPersistence, STORAGE_KEY};

    fn tracker() -> Tracker<MemoryPersistence> {
        Tracker::open(base_catalog(), MemoryPersistence::new())
    }

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["shard_cli"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments should parse").command
    }

    fn validation_error(err: &anyhow::Error) -> ValidationError {
        err.downcast_ref::<ValidationError>()
            .cloned()
            .expect("expected a validation error")
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_for_directories() {
        let cli = Cli::try_parse_from(["shard_cli", "status"]).unwrap();
        assert_eq!(cli.content_dir, "./content");
        assert_eq!(cli.save_dir, "./saves");
    }

    #[test]
    fn shard_entry_requires_equals_sign() {
        assert_eq!(
            parse_shard_entry("Yi Sang=130"),
            Ok(("Yi Sang".to_string(), "130".to_string()))
        );
        assert!(parse_shard_entry("faust").is_err());
        assert!(Cli::try_parse_from(["shard_cli", "set-shards", "faust"]).is_err());
    }

    #[test]
    fn log_run_saves_and_reports() {
        let mut tracker = tracker();
        let output = run(&mut tracker, parse(&["log-run", "18"])).unwrap();

        assert!(output.starts_with("Logged run #1: +18 shards for Yi Sang."));
        assert!(output.contains("Shards: 18 / 400"));
        assert!(tracker.persistence().blob(STORAGE_KEY).is_some());
    }

    #[test]
    fn negative_bonus_is_rejected_without_saving() {
        let mut tracker = tracker();
        let err = run(&mut tracker, parse(&["bonus", "-5"])).unwrap_err();

        assert_eq!(
            validation_error(&err).to_string(),
            "Please enter a non-negative number of shards."
        );
        assert_eq!(tracker.record().bonus_shards_total, 0);
        assert!(tracker.persistence().blob(STORAGE_KEY).is_none());
    }

    #[test]
    fn set_shards_accepts_names_and_slugs() {
        let mut tracker = tracker();
        run(
            &mut tracker,
            parse(&["set-shards", "Yi Sang=130", "faust=", "don-quixote=12.5"]),
        )
        .unwrap();

        assert_eq!(tracker.record().shards_for("Yi Sang"), 130);
        assert_eq!(tracker.record().shards_for("Faust"), 0);
        assert_eq!(tracker.record().shards_for("Don Quixote"), 12);
    }

    #[test]
    fn set_shards_rejects_bad_value_for_any_sinner() {
        let mut tracker = tracker();
        let err = run(&mut tracker, parse(&["set-shards", "faust=40", "outis=-1"])).unwrap_err();

        assert_eq!(
            validation_error(&err),
            ValidationError::InvalidShardValue {
                sinner: "Outis".to_string()
            }
        );
        assert_eq!(tracker.record().shards_for("Faust"), 0);
    }

    #[test]
    fn got_it_needs_confirmation() {
        let mut tracker = tracker();
        run(&mut tracker, parse(&["goal", "yi-sang", "yi-sang-blade-lineage"])).unwrap();
        run(&mut tracker, parse(&["set-shards", "yi-sang=500"])).unwrap();

        let preview =
            run(&mut tracker, parse(&["got-it", "Yi Sang", "yi-sang-blade-lineage"])).unwrap();
        assert!(preview.contains("subtract 400 shards"));
        assert!(preview.ends_with("Re-run with --yes to confirm."));
        assert_eq!(tracker.record().shards_for("Yi Sang"), 500);

        let done = run(
            &mut tracker,
            parse(&["got-it", "Yi Sang", "yi-sang-blade-lineage", "--yes"]),
        )
        .unwrap();
        assert!(done.contains("Spent 400 shards; Yi Sang has 100 left."));
        assert!(tracker.goal_items("Yi Sang").is_empty());
    }

    #[test]
    fn reset_without_yes_keeps_progress() {
        let mut tracker = tracker();
        run(&mut tracker, parse(&["log-run", "20"])).unwrap();

        run(&mut tracker, parse(&["reset"])).unwrap();
        assert_eq!(tracker.record().runs_completed, 1);

        run(&mut tracker, parse(&["reset", "--yes"])).unwrap();
        assert_eq!(tracker.record().runs_completed, 0);
    }

    #[test]
    fn unknown_sinner_is_a_validation_error() {
        let mut tracker = tracker();
        let err = run(&mut tracker, parse(&["switch", "Dante"])).unwrap_err();
        assert_eq!(
            validation_error(&err),
            ValidationError::UnknownSinner("Dante".to_string())
        );
    }

    #[test]
    fn views_render_without_mutating() {
        let mut tracker = tracker();
        let before = tracker.record().clone();

        let search = run(&mut tracker, parse(&["search", "blade", "lineage"])).unwrap();
        assert!(search.starts_with("Found under Yi Sang:"));
        let status = run(&mut tracker, parse(&["status", "--sinner", "heathcliff"])).unwrap();
        assert!(status.starts_with("Tracking: Heathcliff"));
        let json = run(&mut tracker, parse(&["overview", "--json"])).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.as_array().map(Vec::len), Some(12));

        assert_eq!(tracker.record(), &before);
        assert!(tracker.persistence().blob(STORAGE_KEY).is_none());
    }

    #[test]
    fn empty_search_is_reported() {
        let mut tracker = tracker();
        let err = run(&mut tracker, parse(&["search", "  "])).unwrap_err();
        assert_eq!(validation_error(&err), ValidationError::EmptySearch);
    }
}
