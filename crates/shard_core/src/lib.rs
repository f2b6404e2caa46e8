//! `shard_core`: shard progress state, goal targets and projections.
//!
//! No filesystem IO. Persistence is injected through the `Persistence` trait
//! and the catalog is passed in by the caller.

mod catalog;
pub mod commands;
mod error;
pub mod goals;
pub mod input;
pub mod projection;
mod record;
pub mod store;
mod tracker;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use commands::{apply_command, propose, validate_command, Command, CommandOutcome, Proposal};
pub use error::ValidationError;
pub use goals::{goal_items, recompute_all_targets, recompute_target, GoalItem};
pub use input::{parse_amount, parse_shard_field};
pub use projection::{compute_overview, compute_projection, OverviewRow, Projection, RunsLeft};
pub use record::empty_item_progress;
pub use store::{load, save, MemoryPersistence, Persistence, STORAGE_KEY};
pub use tracker::Tracker;
pub use types::*;

#[cfg(test)]
mod tests;
