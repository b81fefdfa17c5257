//! Shared domain types.
//!
//! These types are intentionally kept small and owned by the pipeline for the
//! duration of one run:
//!
//! - reconciled input (`DailyRecord`, `Series`)
//! - derived output (`DerivedPoint`, `ColorClass`, `SummaryStatistics`)
//! - run configuration (`BudgetModel`, `ReportConfig`)

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which measurement a file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Pr,
    Ghi,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Pr, Category::Ghi];

    /// Directory name holding this category's files under the data root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Pr => "PR",
            Category::Ghi => "GHI",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One calendar day after merging the PR and GHI observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub ghi: Option<f64>,
    pub pr: Option<f64>,
}

impl DailyRecord {
    pub fn has_data(&self) -> bool {
        self.ghi.is_some() || self.pr.is_some()
    }
}

/// Date-ordered sequence of `DailyRecord`s.
///
/// Invariant: dates are strictly ascending (hence unique) and every record
/// carries at least one value. Both constructors enforce it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    records: Vec<DailyRecord>,
}

impl Series {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a date-keyed map of `(ghi, pr)` pairs. Dates with neither
    /// value are dropped.
    pub fn from_map(map: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)>) -> Self {
        let records = map
            .into_iter()
            .map(|(date, (ghi, pr))| DailyRecord { date, ghi, pr })
            .filter(DailyRecord::has_data)
            .collect();
        Self { records }
    }

    /// Build from arbitrary records, sorting by date.
    ///
    /// Returns the first duplicated date on failure.
    pub fn from_records(mut records: Vec<DailyRecord>) -> Result<Self, NaiveDate> {
        records.retain(DailyRecord::has_data);
        records.sort_by_key(|r| r.date);
        if let Some(pair) = records.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(pair[0].date);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    /// Maximum date present: the reference point for trailing windows.
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Number of records with a PR value.
    pub fn pr_count(&self) -> usize {
        self.records.iter().filter(|r| r.pr.is_some()).count()
    }

    /// Number of records with a GHI value.
    pub fn ghi_count(&self) -> usize {
        self.records.iter().filter(|r| r.ghi.is_some()).count()
    }
}

/// GHI bucket used to color each daily point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorClass {
    NoData,
    Low,
    MidLow,
    MidHigh,
    High,
}

impl ColorClass {
    pub const ALL: [ColorClass; 5] = [
        ColorClass::NoData,
        ColorClass::Low,
        ColorClass::MidLow,
        ColorClass::MidHigh,
        ColorClass::High,
    ];

    /// Legend label for the GHI range.
    pub fn label(self) -> &'static str {
        match self {
            ColorClass::NoData => "GHI n/a",
            ColorClass::Low => "GHI < 2",
            ColorClass::MidLow => "GHI 2-4",
            ColorClass::MidHigh => "GHI 4-6",
            ColorClass::High => "GHI > 6",
        }
    }

    /// Stable lowercase name used in exports.
    pub fn name(self) -> &'static str {
        match self {
            ColorClass::NoData => "no_data",
            ColorClass::Low => "low",
            ColorClass::MidLow => "mid_low",
            ColorClass::MidHigh => "mid_high",
            ColorClass::High => "high",
        }
    }
}

/// A `DailyRecord` plus the derived chart fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedPoint {
    pub record: DailyRecord,
    /// Trailing moving average of PR; `None` until the window is full.
    pub pr_moving_avg: Option<f64>,
    pub budget_pr: f64,
    pub color_class: ColorClass,
}

/// Mean PR over the records newer than `anchor - days`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingAverage {
    pub days: i64,
    pub average: Option<f64>,
}

/// Whole-series aggregates handed to the rendering layer.
///
/// `None` means "no contributing data" and is displayed as `N/A`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub first_date: NaiveDate,
    pub anchor_date: NaiveDate,
    pub points_above_budget: usize,
    pub total_valid_points: usize,
    pub above_budget_ratio: Option<f64>,
    pub trailing: Vec<TrailingAverage>,
    pub lifetime_average: Option<f64>,
}

impl SummaryStatistics {
    pub fn trailing_average(&self, days: i64) -> Option<f64> {
        self.trailing
            .iter()
            .find(|t| t.days == days)
            .and_then(|t| t.average)
    }
}

/// Contractual target PR: a nameplate rate degraded by a fixed fraction for
/// every full 365-day year since `start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetModel {
    pub nameplate: f64,
    pub annual_degradation: f64,
    pub start: NaiveDate,
}

impl BudgetModel {
    pub const DEFAULT_NAMEPLATE: f64 = 73.9;
    pub const DEFAULT_DEGRADATION: f64 = 0.008;

    pub fn default_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 7, 1).expect("2019-07-01 is a valid date")
    }
}

impl Default for BudgetModel {
    fn default() -> Self {
        Self {
            nameplate: Self::DEFAULT_NAMEPLATE,
            annual_degradation: Self::DEFAULT_DEGRADATION,
            start: Self::default_start(),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Root holding the `PR/` and `GHI/` directories.
    pub data_dir: PathBuf,
    /// Combined `Date,GHI,PR` export; `None` disables it.
    pub combined_path: Option<PathBuf>,
    /// SVG chart output; `None` disables rendering.
    pub chart_path: Option<PathBuf>,

    pub budget: BudgetModel,
    /// Moving-average window in records (not days).
    pub ma_window: usize,

    pub preview: bool,
    pub preview_width: usize,
    pub preview_height: usize,

    pub export_points: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,

    /// List every skipped file in the terminal summary.
    pub verbose: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/data"),
            combined_path: Some(PathBuf::from("combined_data.csv")),
            chart_path: Some(PathBuf::from("pr_graph.svg")),
            budget: BudgetModel::default(),
            ma_window: 30,
            preview: false,
            preview_width: 100,
            preview_height: 25,
            export_points: None,
            export_summary: None,
            verbose: false,
        }
    }
}
