//! Reporting: the structured chart description and terminal text.

pub mod format;

pub use format::*;

use chrono::NaiveDate;

use crate::analytics::Derivation;
use crate::domain::{DerivedPoint, SummaryStatistics};

pub const CHART_TITLE: &str = "Performance Ratio Evolution";
pub const BUDGET_SERIES_LABEL: &str = "Target Budget Yield Performance Ratio";

/// Everything a chart sink needs; no sink computes statistics itself.
#[derive(Debug, Clone)]
pub struct ChartDescription<'a> {
    pub points: &'a [DerivedPoint],
    pub summary: &'a SummaryStatistics,
    pub title: String,
    /// `From {first} to {last}`.
    pub subtitle: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub budget_label: String,
    pub ratio_label: String,
    pub summary_lines: Vec<String>,
    pub moving_average_label: String,
    /// Budget at contract start, used to place the annotations.
    pub nameplate: f64,
}

/// Build the chart description for a derivation.
pub fn describe_chart(derivation: &Derivation) -> ChartDescription<'_> {
    let summary = &derivation.summary;
    ChartDescription {
        points: &derivation.points,
        summary,
        title: CHART_TITLE.to_string(),
        subtitle: format!("From {} to {}", summary.first_date, summary.anchor_date),
        first_date: summary.first_date,
        last_date: summary.anchor_date,
        budget_label: format_budget_label(&derivation.milestones),
        ratio_label: format_ratio_label(summary),
        summary_lines: format_summary_lines(summary),
        moving_average_label: format!("{}-d moving average of PR", derivation.ma_window),
        nameplate: derivation.budget.nameplate,
    }
}
