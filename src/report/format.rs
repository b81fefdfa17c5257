//! Formatted text shared by the terminal summary and the chart annotations.
//!
//! We keep formatting code in one place so:
//! - the derivation code stays clean and testable
//! - the chart and the terminal always print the same numbers

use crate::analytics::Derivation;
use crate::domain::SummaryStatistics;
use crate::io::ingest::{IngestedData, SkippedFile};

pub const NOT_AVAILABLE: &str = "N/A";

/// `Budget PR: [1Y=73.9%, 2Y=73.3%, 3Y=72.7%]`
pub fn format_budget_label(milestones: &[f64; 3]) -> String {
    let [y1, y2, y3] = milestones;
    format!("Budget PR: [1Y={y1:.1}%, 2Y={y2:.1}%, 3Y={y3:.1}%]")
}

/// `Points above Target Budget PR = 1/4 = 25.0%`, or `= N/A` without PR data.
pub fn format_ratio_label(summary: &SummaryStatistics) -> String {
    match summary.above_budget_ratio {
        Some(ratio) => format!(
            "Points above Target Budget PR = {}/{} = {:.1}%",
            summary.points_above_budget,
            summary.total_valid_points,
            ratio * 100.0
        ),
        None => format!("Points above Target Budget PR = {NOT_AVAILABLE}"),
    }
}

/// Lines of the averages box: one per trailing window, a blank line, then
/// the lifetime average.
pub fn format_summary_lines(summary: &SummaryStatistics) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .trailing
        .iter()
        .map(|t| format!("Average PR (last {}-d): {}", t.days, fmt_pct_value(t.average)))
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "Lifetime Average PR: {}",
        fmt_pct_value(summary.lifetime_average)
    ));
    lines
}

/// `71.3 %` or `N/A`.
pub fn fmt_pct_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1} %"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format the full run summary (ingest stats + annotations + averages).
pub fn format_run_summary(ingest: &IngestedData, derivation: &Derivation) -> String {
    let mut out = String::new();
    let summary = &derivation.summary;

    out.push_str("=== pr - Performance Ratio Report ===\n");
    out.push_str(&format!("Source: {}\n", ingest.source));
    out.push_str(&format!(
        "Files: seen={} | used={} | skipped={}\n",
        ingest.files_seen,
        ingest.files_used,
        ingest.skipped.len()
    ));
    out.push_str(&format!(
        "Range: {} to {} | dates={} | PR={} | GHI={}\n",
        summary.first_date,
        summary.anchor_date,
        ingest.series.len(),
        ingest.series.pr_count(),
        ingest.series.ghi_count(),
    ));

    out.push('\n');
    out.push_str(&format_budget_label(&derivation.milestones));
    out.push('\n');
    out.push_str(&format_ratio_label(summary));
    out.push_str("\n\n");

    for line in format_summary_lines(summary) {
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// One line per skipped file.
pub fn format_skipped(skipped: &[SkippedFile]) -> String {
    let mut out = String::new();
    if skipped.is_empty() {
        return out;
    }

    out.push_str("Skipped files:\n");
    for s in skipped {
        out.push_str(&format!("  {:<4} {}: {}\n", s.category.dir_name(), s.origin, s.reason));
    }
    out
}

/// Message for a run that found nothing to report.
pub fn format_empty(ingest: &IngestedData) -> String {
    format!(
        "No data found in {} (files seen={}, skipped={}).",
        ingest.source,
        ingest.files_seen,
        ingest.skipped.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, TrailingAverage};
    use crate::io::ingest::SkipReason;
    use chrono::NaiveDate;

    fn summary(ratio: Option<f64>, seven: Option<f64>) -> SummaryStatistics {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SummaryStatistics {
            first_date: date,
            anchor_date: date,
            points_above_budget: 1,
            total_valid_points: if ratio.is_some() { 4 } else { 0 },
            above_budget_ratio: ratio,
            trailing: vec![
                TrailingAverage {
                    days: 7,
                    average: seven,
                },
                TrailingAverage {
                    days: 30,
                    average: Some(72.04),
                },
            ],
            lifetime_average: Some(70.0),
        }
    }

    #[test]
    fn budget_label_uses_one_decimal() {
        assert_eq!(
            format_budget_label(&[73.9, 73.3, 72.7]),
            "Budget PR: [1Y=73.9%, 2Y=73.3%, 3Y=72.7%]"
        );
    }

    #[test]
    fn ratio_label_formats_percent_or_na() {
        assert_eq!(
            format_ratio_label(&summary(Some(0.25), None)),
            "Points above Target Budget PR = 1/4 = 25.0%"
        );
        assert_eq!(
            format_ratio_label(&summary(None, None)),
            "Points above Target Budget PR = N/A"
        );
    }

    #[test]
    fn undefined_averages_print_na() {
        let lines = format_summary_lines(&summary(Some(0.25), None));
        assert_eq!(
            lines,
            vec![
                "Average PR (last 7-d): N/A".to_string(),
                "Average PR (last 30-d): 72.0 %".to_string(),
                String::new(),
                "Lifetime Average PR: 70.0 %".to_string(),
            ]
        );
        assert_eq!(fmt_pct_value(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn skipped_listing() {
        let skipped = vec![SkippedFile {
            category: Category::Ghi,
            origin: "GHI/bad.csv".to_string(),
            reason: SkipReason::InvalidDate,
        }];
        assert_eq!(
            format_skipped(&skipped),
            "Skipped files:\n  GHI  GHI/bad.csv: file name is not a YYYY-MM-DD date\n"
        );
        assert_eq!(format_skipped(&[]), "");
    }
}
