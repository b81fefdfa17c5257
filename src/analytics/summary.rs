//! Whole-series summary statistics.
//!
//! Every mean is `None` when nothing contributes to it; callers display that
//! as `N/A`.

use chrono::{Duration, NaiveDate};

use crate::domain::{DerivedPoint, SummaryStatistics, TrailingAverage};

/// Trailing windows (days before the anchor date) reported in the summary.
pub const TRAILING_WINDOWS: [i64; 5] = [7, 30, 60, 90, 365];

/// Arithmetic mean, `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// `(above, valid)`: points with a PR value, and how many of them beat the
/// budget strictly.
pub fn count_above_budget(points: &[DerivedPoint]) -> (usize, usize) {
    points
        .iter()
        .filter_map(|p| p.record.pr.map(|pr| pr > p.budget_pr))
        .fold((0, 0), |(above, valid), beats| (above + usize::from(beats), valid + 1))
}

/// Mean PR over points dated strictly after `anchor - days`.
pub fn trailing_average(points: &[DerivedPoint], anchor: NaiveDate, days: i64) -> Option<f64> {
    let cutoff = anchor - Duration::days(days);
    mean(
        points
            .iter()
            .filter(|p| p.record.date > cutoff)
            .filter_map(|p| p.record.pr),
    )
}

/// Summarize derived points. `None` for an empty slice.
pub fn summarize(points: &[DerivedPoint]) -> Option<SummaryStatistics> {
    let first_date = points.first()?.record.date;
    let anchor_date = points.iter().map(|p| p.record.date).max()?;

    let (points_above_budget, total_valid_points) = count_above_budget(points);
    let above_budget_ratio =
        (total_valid_points > 0).then(|| points_above_budget as f64 / total_valid_points as f64);

    let trailing = TRAILING_WINDOWS
        .iter()
        .map(|&days| TrailingAverage {
            days,
            average: trailing_average(points, anchor_date, days),
        })
        .collect();

    Some(SummaryStatistics {
        first_date,
        anchor_date,
        points_above_budget,
        total_valid_points,
        above_budget_ratio,
        trailing,
        lifetime_average: mean(points.iter().filter_map(|p| p.record.pr)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColorClass, DailyRecord};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn point(date: NaiveDate, pr: Option<f64>, budget: f64) -> DerivedPoint {
        DerivedPoint {
            record: DailyRecord {
                date,
                ghi: None,
                pr,
            },
            pr_moving_avg: None,
            budget_pr: budget,
            color_class: ColorClass::NoData,
        }
    }

    #[test]
    fn above_budget_is_strict() {
        let base = d(2024, 1, 1);
        let points: Vec<_> = [80.0, 70.0, 73.9, 60.0]
            .iter()
            .enumerate()
            .map(|(i, &pr)| point(base + Duration::days(i as i64), Some(pr), 73.9))
            .collect();

        let summary = summarize(&points).unwrap();
        assert_eq!(summary.points_above_budget, 1);
        assert_eq!(summary.total_valid_points, 4);
        assert_eq!(summary.above_budget_ratio, Some(0.25));
    }

    #[test]
    fn ratio_is_undefined_without_pr() {
        let points = vec![point(d(2024, 1, 1), None, 73.9)];
        let summary = summarize(&points).unwrap();
        assert_eq!(summary.total_valid_points, 0);
        assert_eq!(summary.above_budget_ratio, None);
        assert_eq!(summary.lifetime_average, None);
        assert!(summary.trailing.iter().all(|t| t.average.is_none()));
    }

    #[test]
    fn trailing_windows_are_half_open() {
        let anchor = d(2024, 3, 31);
        let points = vec![
            point(anchor - Duration::days(7), Some(10.0), 73.9),
            point(anchor - Duration::days(6), Some(20.0), 73.9),
            point(anchor, Some(30.0), 73.9),
        ];

        // Exactly 7 days back is excluded.
        assert_eq!(trailing_average(&points, anchor, 7), Some(25.0));
        assert_eq!(trailing_average(&points, anchor, 30), Some(20.0));
    }

    #[test]
    fn window_without_pr_is_undefined() {
        let anchor = d(2024, 3, 31);
        let points = vec![
            point(anchor - Duration::days(40), Some(75.0), 73.9),
            point(anchor, None, 73.9),
        ];

        let summary = summarize(&points).unwrap();
        assert_eq!(summary.anchor_date, anchor);
        assert_eq!(summary.trailing_average(7), None);
        assert_eq!(summary.trailing_average(30), None);
        assert_eq!(summary.trailing_average(60), Some(75.0));
        assert_eq!(summary.lifetime_average, Some(75.0));
    }

    #[test]
    fn single_anchor_record_counts_in_its_own_window() {
        let anchor = d(2024, 3, 31);
        let summary = summarize(&[point(anchor, Some(70.0), 73.9)]).unwrap();
        assert_eq!(summary.trailing_average(7), Some(70.0));
    }

    #[test]
    fn empty_input_has_no_summary() {
        assert!(summarize(&[]).is_none());
        assert_eq!(mean(std::iter::empty()), None);
    }
}
