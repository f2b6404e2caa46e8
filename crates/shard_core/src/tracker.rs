//! `Tracker` bundles the catalog, the loaded record and its persistence so
//! front-ends drive everything through one value.

use chrono::{DateTime, Utc};

use crate::commands::{apply_command, commit, propose};
use crate::goals::{goal_items, GoalItem};
use crate::projection::{compute_overview, compute_projection, OverviewRow, Projection};
use crate::store::{load, save, Persistence};
use crate::{
    Catalog, Command, CommandOutcome, HistoryEntry, ProgressRecord, Proposal, ValidationError,
};

pub struct Tracker<P: Persistence> {
    catalog: Catalog,
    persistence: P,
    record: ProgressRecord,
}

impl<P: Persistence> Tracker<P> {
    /// Loads the stored record, falling back to a fresh one.
    pub fn open(catalog: Catalog, persistence: P) -> Self {
        let record = load(&persistence, &catalog);
        Self {
            catalog,
            persistence,
            record,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn into_persistence(self) -> P {
        self.persistence
    }

    /// Applies `command` and saves. Nothing is saved when validation fails.
    pub fn execute(
        &mut self,
        command: Command,
        now: DateTime<Utc>,
    ) -> Result<CommandOutcome, ValidationError> {
        let outcome = apply_command(&mut self.record, &self.catalog, command, now)?;
        save(&mut self.persistence, &self.record);
        Ok(outcome)
    }

    pub fn propose(&self, command: Command) -> Result<Proposal, ValidationError> {
        propose(&self.record, &self.catalog, command)
    }

    /// Commits a proposal the user confirmed, then saves.
    pub fn commit(
        &mut self,
        proposal: Proposal,
        now: DateTime<Utc>,
    ) -> Result<CommandOutcome, ValidationError> {
        let outcome = commit(&mut self.record, &self.catalog, proposal, now)?;
        save(&mut self.persistence, &self.record);
        Ok(outcome)
    }

    /// Projection for the active Sinner.
    pub fn projection(&self) -> Projection {
        compute_projection(&self.record, &self.catalog, &self.record.active_sinner)
    }

    pub fn projection_for(&self, sinner: &str) -> Projection {
        compute_projection(&self.record, &self.catalog, sinner)
    }

    pub fn overview(&self) -> Vec<OverviewRow> {
        compute_overview(&self.record, &self.catalog)
    }

    pub fn goal_items(&self, sinner: &str) -> Vec<GoalItem> {
        goal_items(&self.record, &self.catalog, sinner)
    }

    pub fn history_newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.record.history.iter().rev()
    }
}
