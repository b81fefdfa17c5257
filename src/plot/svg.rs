//! Plotters-powered PR chart written to SVG.
//!
//! Layout:
//! - daily PR scatter, one series per GHI class (colored)
//! - moving-average line (red), budget line (dark green)
//! - budget label and above-budget annotation just above/below the nameplate
//! - boxed averages in the lower right, legend in the upper right
//!
//! The SVG backend emits text as `<text>` elements, so no font stack is needed.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;

use crate::domain::ColorClass;
use crate::error::AppError;
use crate::plot::ChartSink;
use crate::plot::ascii::moving_average_segments;
use crate::report::{BUDGET_SERIES_LABEL, ChartDescription};

const NAVY: RGBColor = RGBColor(0, 0, 128);
const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const BROWN: RGBColor = RGBColor(165, 42, 42);
const GRAY: RGBColor = RGBColor(128, 128, 128);
const DARK_GREEN: RGBColor = RGBColor(0, 100, 0);

/// Writes the chart to `path` as SVG.
#[derive(Debug, Clone)]
pub struct SvgChart {
    path: PathBuf,
    size: (u32, u32),
}

impl SvgChart {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: (1300, 1300),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

impl ChartSink for SvgChart {
    fn render(&mut self, chart: &ChartDescription<'_>) -> Result<(), AppError> {
        draw_chart(&self.path, self.size, chart).map_err(|e| {
            AppError::output(format!("Failed to render chart '{}': {e}", self.path.display()))
        })?;
        log::info!("Saved chart to {}", self.path.display());
        Ok(())
    }
}

pub fn class_color(class: ColorClass) -> RGBColor {
    match class {
        ColorClass::NoData => GRAY,
        ColorClass::Low => NAVY,
        ColorClass::MidLow => LIGHT_BLUE,
        ColorClass::MidHigh => ORANGE,
        ColorClass::High => BROWN,
    }
}

fn draw_chart(
    path: &Path,
    size: (u32, u32),
    chart: &ChartDescription<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&chart.title, ("sans-serif", 28))?;
    let root = root.titled(&chart.subtitle, ("sans-serif", 20))?;

    // Pad the date axis so edge points are not drawn on the frame.
    let x0 = chart.first_date - Duration::days(5);
    let x1 = chart.last_date + Duration::days(5);
    let (y0, y1) = y_bounds(chart);

    let mut cc = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    cc.configure_mesh()
        .x_desc("Date")
        .y_desc("Performance Ratio [%]")
        .x_labels(10)
        .y_labels(10)
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
        .draw()?;

    // 1) Daily PR, one series per GHI class so each gets a legend entry.
    for class in ColorClass::ALL {
        let color = class_color(class);
        let pts: Vec<(NaiveDate, f64)> = chart
            .points
            .iter()
            .filter(|p| p.color_class == class)
            .filter_map(|p| p.record.pr.map(|pr| (p.record.date, pr)))
            .collect();
        if pts.is_empty() {
            continue;
        }
        cc.draw_series(pts.into_iter().map(|c| Circle::new(c, 3, color.mix(0.8).filled())))?
            .label(class.label())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    // 2) Moving average, broken where undefined.
    for (i, segment) in moving_average_segments(chart.points).into_iter().enumerate() {
        let series = cc.draw_series(LineSeries::new(segment, RED.stroke_width(2)))?;
        if i == 0 {
            series
                .label(chart.moving_average_label.as_str())
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        }
    }

    // 3) Budget curve.
    cc.draw_series(LineSeries::new(
        chart.points.iter().map(|p| (p.record.date, p.budget_pr)),
        DARK_GREEN.stroke_width(2),
    ))?
    .label(BUDGET_SERIES_LABEL)
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DARK_GREEN.stroke_width(2)));

    // 4) Annotations next to the nameplate level.
    cc.draw_series(std::iter::once(Text::new(
        chart.budget_label.clone(),
        (chart.first_date, chart.nameplate + 1.6),
        ("sans-serif", 15).into_font().color(&DARK_GREEN),
    )))?;
    cc.draw_series(std::iter::once(Text::new(
        chart.ratio_label.clone(),
        (chart.first_date, chart.nameplate - 0.4),
        ("sans-serif", 15).into_font().color(&BLACK),
    )))?;

    // 5) Averages box, anchored in data space and laid out in pixels.
    let span = (chart.last_date - chart.first_date).num_days();
    let box_anchor = (
        chart.first_date + Duration::days(span * 2 / 3),
        y0 + (y1 - y0) * 0.3,
    );
    let line_h = 18;
    let box_h = line_h * chart.summary_lines.len() as i32 + 16;
    cc.draw_series(std::iter::once(
        EmptyElement::at(box_anchor) + Rectangle::new([(0, 0), (300, box_h)], WHITE.filled()),
    ))?;
    cc.draw_series(std::iter::once(
        EmptyElement::at(box_anchor)
            + Rectangle::new([(0, 0), (300, box_h)], BLACK.stroke_width(1)),
    ))?;
    for (i, line) in chart.summary_lines.iter().enumerate() {
        let offset = (10, 8 + line_h * i as i32);
        cc.draw_series(std::iter::once(
            EmptyElement::at(box_anchor)
                + Text::new(line.clone(), offset, ("sans-serif", 14).into_font()),
        ))?;
    }

    cc.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", 14))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Y range covering PR, moving average, budget and the annotations.
fn y_bounds(chart: &ChartDescription<'_>) -> (f64, f64) {
    let mut lo = chart.nameplate - 2.0;
    let mut hi = chart.nameplate + 4.0;
    for p in chart.points {
        for v in [p.record.pr, p.pr_moving_avg, Some(p.budget_pr)].into_iter().flatten() {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::derive;
    use crate::domain::{BudgetModel, DailyRecord, Series};
    use crate::report::describe_chart;

    fn derivation() -> crate::analytics::Derivation {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let records = (0..60)
            .map(|i| DailyRecord {
                date: start + Duration::days(i),
                ghi: (i % 7 != 0).then(|| (i % 8) as f64),
                pr: (i % 11 != 0).then(|| 65.0 + (i % 15) as f64),
            })
            .collect();
        let series = Series::from_records(records).unwrap();
        derive(&series, &BudgetModel::default(), 30).unwrap()
    }

    #[test]
    fn y_bounds_include_annotations_and_data() {
        let derivation = derivation();
        let chart = describe_chart(&derivation);
        let (lo, hi) = y_bounds(&chart);
        assert!(lo < 65.0);
        assert!(hi > 79.0);
        assert!(hi > chart.nameplate + 1.6);
    }

    #[test]
    fn svg_chart_is_written() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pr_graph.svg");
        let derivation = derivation();

        let mut sink = SvgChart::new(&path).with_size(800, 800);
        sink.render(&describe_chart(&derivation)).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Performance Ratio Evolution"));
    }

    #[test]
    fn every_class_has_a_distinct_color() {
        let colors: Vec<_> = ColorClass::ALL.iter().map(|c| class_color(*c)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!((a.0, a.1, a.2), (b.0, b.1, b.2));
            }
        }
    }
}
