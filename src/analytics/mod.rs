//! Derivation and summary engine.
//!
//! Responsibilities:
//!
//! - trailing moving average of PR over record positions (`rolling`)
//! - stepped budget curve and legend milestones (`budget`)
//! - GHI color buckets (`classify`)
//! - above-budget ratio and windowed averages (`summary`)

pub mod budget;
pub mod classify;
pub mod rolling;
pub mod summary;

pub use budget::*;
pub use classify::*;
pub use rolling::*;
pub use summary::*;

use crate::domain::{BudgetModel, DerivedPoint, Series, SummaryStatistics};

/// Derived points plus whole-series aggregates.
#[derive(Debug, Clone)]
pub struct Derivation {
    pub points: Vec<DerivedPoint>,
    pub summary: SummaryStatistics,
    /// Budget for contract years 1-3, rounded for display.
    pub milestones: [f64; 3],
    pub budget: BudgetModel,
    pub ma_window: usize,
}

/// Derive every point and the summary. `None` for an empty series.
pub fn derive(series: &Series, budget: &BudgetModel, ma_window: usize) -> Option<Derivation> {
    let records = series.records();
    let pr: Vec<Option<f64>> = records.iter().map(|r| r.pr).collect();
    let moving = trailing_mean(&pr, ma_window);

    let points: Vec<DerivedPoint> = records
        .iter()
        .zip(moving)
        .map(|(record, pr_moving_avg)| DerivedPoint {
            record: *record,
            pr_moving_avg,
            budget_pr: budget_pr(budget, record.date),
            color_class: classify_ghi(record.ghi),
        })
        .collect();

    let summary = summarize(&points)?;
    log::debug!(
        "Derived {} points ({} with PR, ma window {ma_window})",
        points.len(),
        summary.total_valid_points
    );

    Some(Derivation {
        points,
        summary,
        milestones: milestones(budget),
        budget: *budget,
        ma_window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColorClass, DailyRecord};
    use chrono::{Duration, NaiveDate};

    #[test]
    fn derive_fills_every_field() {
        let start = NaiveDate::from_ymd_opt(2020, 7, 10).unwrap();
        let records: Vec<DailyRecord> = (0..35)
            .map(|i| DailyRecord {
                date: start + Duration::days(i),
                ghi: if i == 0 { None } else { Some(i as f64 / 5.0) },
                pr: Some(50.0),
            })
            .collect();
        let series = Series::from_records(records).unwrap();

        let out = derive(&series, &BudgetModel::default(), 30).unwrap();
        assert_eq!(out.points.len(), 35);
        assert!(out.points[..29].iter().all(|p| p.pr_moving_avg.is_none()));
        assert!(out.points[29..].iter().all(|p| p.pr_moving_avg == Some(50.0)));
        assert!(out.points.iter().all(|p| (p.budget_pr - 73.9 * 0.992).abs() < 1e-9));
        assert_eq!(out.points[0].color_class, ColorClass::NoData);
        assert_eq!(out.points[10].color_class, ColorClass::MidLow);
        assert_eq!(out.summary.points_above_budget, 0);
        assert_eq!(out.milestones, [73.9, 73.3, 72.7]);
    }

    #[test]
    fn derive_skips_empty_series() {
        assert!(derive(&Series::empty(), &BudgetModel::default(), 30).is_none());
    }
}
