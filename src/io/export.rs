//! CSV/JSON exports.
//!
//! - combined table (`Date,GHI,PR`): the reconciled series, reusable as input
//!   to `pr chart`
//! - derived table: the combined columns plus moving average, budget and class
//! - summary JSON: aggregates and legend values for downstream scripts

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::Derivation;
use crate::domain::{BudgetModel, DailyRecord, Series, SummaryStatistics};
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
struct CombinedRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "GHI")]
    ghi: Option<f64>,
    #[serde(rename = "PR")]
    pr: Option<f64>,
}

#[derive(Debug, Serialize)]
struct DerivedRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "GHI")]
    ghi: Option<f64>,
    #[serde(rename = "PR")]
    pr: Option<f64>,
    #[serde(rename = "PR_MA")]
    pr_moving_avg: Option<f64>,
    #[serde(rename = "Budget_PR")]
    budget_pr: f64,
    #[serde(rename = "Color")]
    color: &'static str,
}

/// Write the reconciled series as `Date,GHI,PR` (empty cell when undefined).
pub fn write_combined_csv(path: &Path, series: &Series) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::output(format!("Failed to create combined CSV '{}': {e}", path.display()))
    })?;

    for r in series.records() {
        writer
            .serialize(CombinedRow {
                date: r.date,
                ghi: r.ghi,
                pr: r.pr,
            })
            .map_err(|e| AppError::output(format!("Failed to write combined CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush combined CSV: {e}")))?;

    log::info!("Saved {} with {} rows", path.display(), series.len());
    Ok(())
}

/// Read a combined CSV written by [`write_combined_csv`].
///
/// Unlike measurement files, this is a single trusted input: any bad row or a
/// duplicated date fails the run.
pub fn read_combined_csv(path: &Path) -> Result<Series, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open combined CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<CombinedRow>().enumerate() {
        let row = result.map_err(|e| {
            AppError::input(format!("Invalid combined CSV row at line {}: {e}", idx + 2))
        })?;
        records.push(DailyRecord {
            date: row.date,
            ghi: row.ghi.filter(|v| v.is_finite()),
            pr: row.pr.filter(|v| v.is_finite()),
        });
    }

    Series::from_records(records).map_err(|date| {
        AppError::input(format!("Combined CSV '{}' repeats date {date}.", path.display()))
    })
}

/// Write every derived point.
pub fn write_points_csv(path: &Path, derivation: &Derivation) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::output(format!("Failed to create points CSV '{}': {e}", path.display()))
    })?;

    for p in &derivation.points {
        writer
            .serialize(DerivedRow {
                date: p.record.date,
                ghi: p.record.ghi,
                pr: p.record.pr,
                pr_moving_avg: p.pr_moving_avg,
                budget_pr: p.budget_pr,
                color: p.color_class.name(),
            })
            .map_err(|e| AppError::output(format!("Failed to write points CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush points CSV: {e}")))?;
    Ok(())
}

/// JSON schema of the summary export.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryFile {
    pub tool: String,
    pub budget: BudgetModel,
    pub budget_milestones: [f64; 3],
    pub moving_average_window: usize,
    pub summary: SummaryStatistics,
}

/// Write aggregates as pretty JSON (`null` for undefined values).
pub fn write_summary_json(path: &Path, derivation: &Derivation) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::output(format!("Failed to create summary JSON '{}': {e}", path.display()))
    })?;

    let out = SummaryFile {
        tool: "pr".to_string(),
        budget: derivation.budget,
        budget_milestones: derivation.milestones,
        moving_average_window: derivation.ma_window,
        summary: derivation.summary.clone(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::output(format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
