//! Command-line parsing for the PR report tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingest/derivation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::BudgetModel;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pr", version, about = "Solar plant Performance Ratio report")]
pub struct Cli {
    /// Debug logging and a per-file listing of skipped inputs.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest the PR/GHI files, print the summary, and render the chart.
    Report(ReportArgs),
    /// Ingest the PR/GHI files and write the combined CSV only.
    Combine(DataArgs),
    /// Render from a previously written combined CSV (no ingest).
    Chart(ChartArgs),
}

/// Where measurement files live and where the combined table goes.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Root directory holding `PR/` and `GHI/` sub-directories.
    #[arg(long, env = "PR_DATA_DIR", default_value = "./data/data")]
    pub data_dir: PathBuf,

    /// Combined `Date,GHI,PR` CSV written after ingest.
    #[arg(long, default_value = "combined_data.csv")]
    pub combined: PathBuf,

    /// Do not write the combined CSV.
    #[arg(long)]
    pub no_combined: bool,
}

/// Derivation and rendering options.
#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// SVG chart output.
    #[arg(short, long, default_value = "pr_graph.svg")]
    pub output: PathBuf,

    /// Skip the SVG chart.
    #[arg(long)]
    pub no_chart: bool,

    /// Print an ASCII preview of the chart.
    #[arg(long)]
    pub preview: bool,

    /// Preview width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Preview height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export every derived point to CSV.
    #[arg(long)]
    pub export_points: Option<PathBuf>,

    /// Export the summary statistics to JSON.
    #[arg(long)]
    pub export_summary: Option<PathBuf>,

    /// Budget PR at contract start (%).
    #[arg(long, default_value_t = BudgetModel::DEFAULT_NAMEPLATE)]
    pub budget_base: f64,

    /// Yearly budget degradation (fraction).
    #[arg(long, default_value_t = BudgetModel::DEFAULT_DEGRADATION)]
    pub budget_degradation: f64,

    /// Contract start date (YYYY-MM-DD).
    #[arg(long, default_value_t = BudgetModel::default_start())]
    pub budget_start: NaiveDate,

    /// Moving-average window (records).
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u16).range(1..))]
    pub ma_window: u16,
}

/// Options for `pr report`.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Options for `pr chart`.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Combined CSV produced by `pr report` or `pr combine`.
    #[arg(short, long, default_value = "combined_data.csv")]
    pub input: PathBuf,

    #[command(flatten)]
    pub render: RenderArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_defaults() {
        let cli = Cli::try_parse_from(["pr", "report"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.render.output, PathBuf::from("pr_graph.svg"));
        assert_eq!(args.render.ma_window, 30);
        assert_eq!(args.render.budget_start, BudgetModel::default_start());
        assert!(!args.data.no_combined);
    }

    #[test]
    fn chart_accepts_budget_overrides() {
        let cli = Cli::try_parse_from([
            "pr",
            "chart",
            "--input",
            "x.csv",
            "--budget-base",
            "80",
            "--budget-start",
            "2020-01-01",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Chart(args) = cli.command else {
            panic!("expected chart");
        };
        assert_eq!(args.input, PathBuf::from("x.csv"));
        assert_eq!(args.render.budget_base, 80.0);
        assert_eq!(
            args.render.budget_start,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(Cli::try_parse_from(["pr", "report", "--ma-window", "0"]).is_err());
    }
}
