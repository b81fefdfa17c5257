//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - budget curve: `=`
//! - moving average: `*` (broken where undefined)
//! - daily PR points by GHI class: `.` `o` `+` `#`, and `?` without GHI

use std::io::Write;

use chrono::NaiveDate;

use crate::domain::{ColorClass, DerivedPoint};
use crate::error::AppError;
use crate::plot::ChartSink;
use crate::report::ChartDescription;

pub const LEGEND: &str =
    "Legend: . GHI<2 | o GHI 2-4 | + GHI 4-6 | # GHI>6 | ? no GHI | * moving avg | = budget";

/// Writes the preview to any `Write` (stdout in the CLI).
pub struct AsciiPreview<W: Write> {
    out: W,
    width: usize,
    height: usize,
}

impl<W: Write> AsciiPreview<W> {
    pub fn new(out: W, width: usize, height: usize) -> Self {
        Self { out, width, height }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartSink for AsciiPreview<W> {
    fn render(&mut self, chart: &ChartDescription<'_>) -> Result<(), AppError> {
        let text = render_ascii_preview(chart, self.width, self.height);
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| AppError::output(format!("Failed to write preview: {e}")))
    }
}

pub fn class_char(class: ColorClass) -> char {
    match class {
        ColorClass::NoData => '?',
        ColorClass::Low => '.',
        ColorClass::MidLow => 'o',
        ColorClass::MidHigh => '+',
        ColorClass::High => '#',
    }
}

/// Render the preview grid with a header and a legend line.
pub fn render_ascii_preview(chart: &ChartDescription<'_>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let points = chart.points;

    let (y_min, y_max) = y_range(points).unwrap_or((0.0, 100.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let x = XScale::new(chart.first_date, chart.last_date, width);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so points overlay them.
    let budget: Vec<(usize, usize)> = points
        .iter()
        .map(|p| (x.map(p.record.date), map_y(p.budget_pr, y_min, y_max, height)))
        .collect();
    draw_polyline(&mut grid, &budget, '=');

    for segment in moving_average_segments(points) {
        let cells: Vec<(usize, usize)> = segment
            .iter()
            .map(|&(d, v)| (x.map(d), map_y(v, y_min, y_max, height)))
            .collect();
        draw_polyline(&mut grid, &cells, '*');
    }

    for p in points {
        if let Some(pr) = p.record.pr {
            let row = map_y(pr, y_min, y_max, height);
            grid[row][x.map(p.record.date)] = class_char(p.color_class);
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} to {} | PR=[{y_min:.2}, {y_max:.2}]%\n",
        chart.first_date, chart.last_date
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(LEGEND);
    out.push('\n');
    out
}

/// Contiguous runs of defined moving-average values.
pub fn moving_average_segments(points: &[DerivedPoint]) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for p in points {
        match p.pr_moving_avg {
            Some(v) => current.push((p.record.date, v)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

struct XScale {
    start: NaiveDate,
    span_days: f64,
    width: usize,
}

impl XScale {
    fn new(start: NaiveDate, end: NaiveDate, width: usize) -> Self {
        let span_days = ((end - start).num_days() as f64).max(1.0);
        Self {
            start,
            span_days,
            width,
        }
    }

    fn map(&self, date: NaiveDate) -> usize {
        let u = ((date - self.start).num_days() as f64 / self.span_days).clamp(0.0, 1.0);
        (u * (self.width as f64 - 1.0)).round() as usize
    }
}

fn y_range(points: &[DerivedPoint]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let values = points.iter().flat_map(|p| {
        [p.record.pr, p.pr_moving_avg, Some(p.budget_pr)]
            .into_iter()
            .flatten()
    });
    for v in values.filter(|v| v.is_finite()) {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], cells: &[(usize, usize)], ch: char) {
    let mut prev: Option<(usize, usize)> = None;
    for &(x, y) in cells {
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, ch),
            None => {
                if grid[y][x] == ' ' {
                    grid[y][x] = ch;
                }
            }
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish). Never overwrites a filled cell.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
