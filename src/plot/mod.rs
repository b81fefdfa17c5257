//! Chart sinks.
//!
//! A sink receives a fully computed [`ChartDescription`] and turns it into an
//! artifact. Sinks never compute statistics; layout and styling are theirs.
//!
//! - `svg`: Plotters chart written to an SVG file
//! - `ascii`: fixed-size terminal preview

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::error::AppError;
use crate::report::ChartDescription;

pub trait ChartSink {
    fn render(&mut self, chart: &ChartDescription<'_>) -> Result<(), AppError>;
}
