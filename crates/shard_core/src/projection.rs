//! Projections derived from a `ProgressRecord`.
//!
//! `compute_projection(&ProgressRecord, &Catalog, sinner) -> Projection` reads
//! the record and catalog only. No state mutation, no IO. Values stay exact
//! here; rounding happens in the `fmt_*` helpers at display time.

use serde::Serialize;

use crate::{Catalog, Constants, ProgressRecord};

/// Placeholder shown for values that cannot be computed yet.
pub const PLACEHOLDER: &str = "–";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "runs", rename_all = "snake_case")]
pub enum RunsLeft {
    TargetReached,
    Runs(f64),
    /// No usable run history yet.
    Unknown,
}

impl RunsLeft {
    pub fn display(&self) -> String {
        match self {
            RunsLeft::TargetReached => "0 (target reached)".to_string(),
            RunsLeft::Runs(runs) => fmt_fixed(*runs, 2),
            RunsLeft::Unknown => PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub sinner: String,
    pub current: u64,
    pub target: u64,
    pub remaining: u64,

    // Theoretical, from the fixed per-box average
    pub expected_shards_per_run: f64,
    pub runs_left_theoretical: f64,
    pub runs_left_theoretical_ceil: u64,
    pub boxes_needed_avg: f64,
    pub modules_needed: u64,

    // Empirical, from logged runs
    pub runs_completed: u64,
    pub actual_average_per_run: Option<f64>,
    pub runs_left_actual: RunsLeft,

    // Informational
    pub bonus_shards_total: u64,
    pub unopened_boxes: u64,
    pub stash_expected_shards: f64,
    pub weekly_bonus_expected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRow {
    pub sinner: String,
    pub current: u64,
    pub target: u64,
    pub remaining: u64,
    pub runs_left_avg: f64,
    pub boxes_needed_avg: f64,
}

pub fn remaining(current: u64, target: u64) -> u64 {
    target.saturating_sub(current)
}

pub fn runs_left_theoretical(remaining: u64, constants: &Constants) -> f64 {
    if remaining == 0 {
        return 0.0;
    }
    remaining as f64 / constants.expected_shards_per_run()
}

/// Rounds a fractional run count up to whole runs.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ceil_runs(runs: f64) -> u64 {
    runs.ceil().max(0.0) as u64
}

pub fn boxes_needed_avg(remaining: u64, constants: &Constants) -> f64 {
    if remaining == 0 {
        return 0.0;
    }
    remaining as f64 / constants.avg_shards_per_box
}

pub fn actual_average_per_run(total_shards_gained: u64, runs_completed: u64) -> Option<f64> {
    if runs_completed == 0 {
        return None;
    }
    Some(total_shards_gained as f64 / runs_completed as f64)
}

pub fn runs_left_actual(remaining: u64, actual_average: Option<f64>) -> RunsLeft {
    if remaining == 0 {
        return RunsLeft::TargetReached;
    }
    match actual_average {
        Some(avg) if avg > 0.0 => RunsLeft::Runs(remaining as f64 / avg),
        _ => RunsLeft::Unknown,
    }
}

pub fn compute_projection(record: &ProgressRecord, catalog: &Catalog, sinner: &str) -> Projection {
    let c = &catalog.constants;
    let current = record.shards_for(sinner);
    let target = record.target_for(sinner, catalog);
    let remaining = remaining(current, target);

    let runs_left = runs_left_theoretical(remaining, c);
    let runs_left_ceil = ceil_runs(runs_left);
    let actual_average = actual_average_per_run(record.total_shards_gained, record.runs_completed);

    Projection {
        sinner: sinner.to_string(),
        current,
        target,
        remaining,
        expected_shards_per_run: c.expected_shards_per_run(),
        runs_left_theoretical: runs_left,
        runs_left_theoretical_ceil: runs_left_ceil,
        boxes_needed_avg: boxes_needed_avg(remaining, c),
        modules_needed: runs_left_ceil.saturating_mul(c.modules_per_run),
        runs_completed: record.runs_completed,
        actual_average_per_run: actual_average,
        runs_left_actual: runs_left_actual(remaining, actual_average),
        bonus_shards_total: record.bonus_shards_total,
        unopened_boxes: record.unopened_boxes,
        stash_expected_shards: record.unopened_boxes as f64 * c.avg_shards_per_box,
        weekly_bonus_expected: c.weekly_bonus_boxes as f64 * c.avg_shards_per_box,
    }
}

/// One row per Sinner, in roster order.
pub fn compute_overview(record: &ProgressRecord, catalog: &Catalog) -> Vec<OverviewRow> {
    let c = &catalog.constants;
    catalog
        .sinner_names()
        .map(|name| {
            let current = record.shards_for(name);
            let target = record.target_for(name, catalog);
            let remaining = remaining(current, target);
            OverviewRow {
                sinner: name.to_string(),
                current,
                target,
                remaining,
                runs_left_avg: runs_left_theoretical(remaining, c),
                boxes_needed_avg: boxes_needed_avg(remaining, c),
            }
        })
        .collect()
}

pub fn fmt_fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

pub fn fmt_optional(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| fmt_fixed(v, decimals))
}
