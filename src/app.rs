//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - runs the reconcile/derive pipeline
//! - prints the summary and renders the chart
//! - writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::{ChartArgs, Command, DataArgs, RenderArgs, ReportArgs};
use crate::domain::{BudgetModel, ReportConfig};
use crate::error::AppError;
use crate::io::source::DirectoryProvider;
use crate::plot::{AsciiPreview, ChartSink, SvgChart};
use crate::report::{describe_chart, format_empty, format_run_summary, format_skipped};

pub mod pipeline;

use pipeline::{PipelineOutcome, RunOutput};

/// Entry point for the `pr` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may provide PR_DATA_DIR and RUST_LOG; a missing file is fine.
    dotenvy::dotenv().ok();

    // We want `pr` and `pr --data-dir X` to behave like `pr report ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Report(args) => handle_report(args, cli.verbose),
        Command::Combine(args) => handle_combine(args),
        Command::Chart(args) => handle_chart(args, cli.verbose),
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init()
        .ok();
}

fn handle_report(args: ReportArgs, verbose: bool) -> Result<(), AppError> {
    let config = report_config_from_args(&args.data, &args.render, verbose);
    let provider = DirectoryProvider::new(&config.data_dir);
    let outcome = pipeline::run_pipeline(&provider, &config)?;
    present(outcome, &config)
}

fn handle_combine(args: DataArgs) -> Result<(), AppError> {
    let provider = DirectoryProvider::new(&args.data_dir);
    let ingest = crate::io::ingest::reconcile(&provider);

    if ingest.is_empty() {
        log::info!("No data found.");
        println!("{}", format_empty(&ingest));
        return Ok(());
    }

    crate::io::export::write_combined_csv(&args.combined, &ingest.series)?;
    println!(
        "Wrote {} dates to {} ({} files used, {} skipped)",
        ingest.series.len(),
        args.combined.display(),
        ingest.files_used,
        ingest.skipped.len()
    );
    Ok(())
}

fn handle_chart(args: ChartArgs, verbose: bool) -> Result<(), AppError> {
    let mut config = render_config_from_args(&args.render, verbose);
    config.combined_path = None;

    let ingest = pipeline::load_combined(&args.input)?;
    let outcome = pipeline::derive_outcome(ingest, &config)?;
    present(outcome, &config)
}

/// Build the full run configuration for `pr report`.
pub fn report_config_from_args(
    data: &DataArgs,
    render: &RenderArgs,
    verbose: bool,
) -> ReportConfig {
    ReportConfig {
        data_dir: data.data_dir.clone(),
        combined_path: (!data.no_combined).then(|| data.combined.clone()),
        ..render_config_from_args(render, verbose)
    }
}

fn render_config_from_args(render: &RenderArgs, verbose: bool) -> ReportConfig {
    ReportConfig {
        chart_path: (!render.no_chart).then(|| render.output.clone()),
        budget: BudgetModel {
            nameplate: render.budget_base,
            annual_degradation: render.budget_degradation,
            start: render.budget_start,
        },
        ma_window: usize::from(render.ma_window),
        preview: render.preview,
        preview_width: render.width,
        preview_height: render.height,
        export_points: render.export_points.clone(),
        export_summary: render.export_summary.clone(),
        verbose,
        ..ReportConfig::default()
    }
}

/// Print the summary, render the configured sinks, and write exports.
fn present(outcome: PipelineOutcome, config: &ReportConfig) -> Result<(), AppError> {
    let run: RunOutput = match outcome {
        PipelineOutcome::Complete(run) => *run,
        PipelineOutcome::Empty(ingest) => {
            log::info!("No data found.");
            println!("{}", format_empty(&ingest));
            if config.verbose {
                print!("{}", format_skipped(&ingest.skipped));
            }
            return Ok(());
        }
    };

    println!("{}", format_run_summary(&run.ingest, &run.derivation));
    if config.verbose {
        print!("{}", format_skipped(&run.ingest.skipped));
    }

    let chart = describe_chart(&run.derivation);
    if let Some(path) = &config.chart_path {
        SvgChart::new(path).render(&chart)?;
    }
    if config.preview {
        let stdout = std::io::stdout();
        AsciiPreview::new(stdout.lock(), config.preview_width, config.preview_height)
            .render(&chart)?;
    }

    if let Some(path) = &config.export_points {
        crate::io::export::write_points_csv(path, &run.derivation)?;
    }
    if let Some(path) = &config.export_summary {
        crate::io::export::write_summary_json(path, &run.derivation)?;
    }

    log_outputs(config);
    Ok(())
}

fn log_outputs(config: &ReportConfig) {
    let written: Vec<&Path> = [
        config.combined_path.as_deref(),
        config.chart_path.as_deref(),
        config.export_points.as_deref(),
        config.export_summary.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    log::debug!("Outputs: {written:?}");
}

/// Rewrite argv so `pr` defaults to `pr report`.
///
/// Rules:
/// - `pr`                      -> `pr report`
/// - `pr --data-dir X ...`     -> `pr report --data-dir X ...`
/// - `pr --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `pr -v chart ...`         -> unchanged (global flags before a subcommand)
/// - `pr --data-dir chart`     -> `pr report --data-dir chart`
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // Only the first token after the global flags can name a subcommand;
    // later tokens may be flag values such as `--data-dir chart`.
    let first = argv[1..]
        .iter()
        .find(|a| !matches!(a.as_str(), "-v" | "--verbose"));
    let runs_report = match first.map(String::as_str) {
        Some("report" | "combine" | "chart") => false,
        // Only global flags, or a leading flag: treat as "report flags".
        Some(token) => token.starts_with('-'),
        None => true,
    };
    if runs_report {
        argv.insert(1, "report".to_string());
    }

    argv
}
